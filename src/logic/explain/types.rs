use serde::{Deserialize, Serialize};

use crate::logic::external_intel::KnowledgeContext;
use crate::logic::threat::Confidence;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub name: String,
    pub value: f64,     // normalized, signed
    pub magnitude: f64, // |value|
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
    pub triage_steps: Vec<String>,
    pub recommended_actions: Vec<String>,
}

/// Analyst-facing explanation of one alert
#[derive(Debug, Clone, Serialize)]
pub struct AssistantReport {
    pub predicted_attack_type: String,
    pub confidence: Confidence,
    pub reasons: Vec<String>,
    pub explanation: String,
    pub triage_steps: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub knowledge: KnowledgeContext,
    pub disclaimer: String,
}
