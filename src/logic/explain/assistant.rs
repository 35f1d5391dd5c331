//! Analyst Assistant
//!
//! Builds a readable, auditable explanation of an alert from fixed
//! templates. Uses the scored hypothesis variant, so its confidence may
//! differ from the rule-table hypothesis embedded in the alert.

use super::playbook::playbook;
use super::types::AssistantReport;
use crate::logic::alert::Alert;
use crate::logic::external_intel;
use crate::logic::threat::scored;

pub const DISCLAIMER: &str = "Note: the predicted attack type is a heuristic hypothesis, not ground truth from labels. The final decision belongs to the analyst.";

/// Deterministic text summary of an alert
pub fn render_explanation(alert: &Alert) -> String {
    let features = if alert.evidence.top_features.is_empty() {
        "not available".to_string()
    } else {
        alert
            .evidence
            .top_features
            .iter()
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Anomalous network behavior was detected by the anomaly model ({}). \
         Current anomaly score = {:.4} (alert threshold = {:.4}). \
         Severity is {}. \
         Ensemble votes: {}/3. \
         Most influential indicators: {}.",
        alert.ml.model,
        alert.ml.score,
        alert.ml.threshold,
        alert.ml.severity,
        alert.ml.ensemble.votes,
        features
    )
}

pub fn explain_alert(alert: &Alert) -> AssistantReport {
    let hypothesis = scored::assess(
        &alert.evidence.top_features,
        Some(alert.ml.score),
        Some(alert.ml.threshold),
    );
    let pb = playbook(&hypothesis.label, alert.ml.severity);
    let knowledge = external_intel::lookup(&hypothesis.label);

    AssistantReport {
        explanation: render_explanation(alert),
        predicted_attack_type: hypothesis.label,
        confidence: hypothesis.confidence,
        reasons: hypothesis.reasons,
        triage_steps: pb.triage_steps,
        recommended_actions: pb.recommended_actions,
        knowledge,
        disclaimer: DISCLAIMER.to_string(),
    }
}
