use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DetectorDegradedWarning;
use crate::logic::model::{DetectorVerdict, Severity};
use crate::logic::threat::{Confidence, Evidence, Hypothesis};

/// Primary-detector decision in alert form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDecision {
    Anomaly,
    Normal,
}

/// Ensemble vote details attached to the ml block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleBlock {
    pub votes: u8,
    pub is_anomaly: bool,
    pub verdicts: Vec<DetectorVerdict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlBlock {
    pub model: String,
    pub score: f64,
    pub threshold: f64,
    pub decision: AlertDecision,
    pub severity: Severity,
    pub ensemble: EnsembleBlock,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degradations: Vec<DetectorDegradedWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBlock {
    pub top_features: Evidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisBlock {
    pub label: String,
    pub confidence: Confidence,
    pub reason: String,
    pub reasons: Vec<String>,
}

impl From<&Hypothesis> for HypothesisBlock {
    fn from(h: &Hypothesis) -> Self {
        Self {
            label: h.label.clone(),
            confidence: h.confidence,
            reason: h.reason(),
            reasons: h.reasons.clone(),
        }
    }
}

/// Immutable per-row alert; the only object handed to display,
/// reporting and explanation layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub summary: String,
    pub row: usize,
    pub ml: MlBlock,
    pub evidence: EvidenceBlock,
    pub hypothesis: HypothesisBlock,
    /// Ground-truth label from the input, if the batch carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Alert {
    pub fn is_anomaly(&self) -> bool {
        self.ml.decision == AlertDecision::Anomaly
    }
}
