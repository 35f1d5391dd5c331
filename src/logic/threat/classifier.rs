//! Rule-Table Hypothesis
//!
//! First matching rule wins; there is no scoring across categories.
//! Input: Evidence + Severity. Output: Hypothesis.

use super::rules::{LABEL_DOS, LABEL_RECON, THROUGHPUT_FEATURES, TIMING_FEATURES};
use super::types::{Confidence, Evidence, Hypothesis, HypothesisStrategy};
use crate::logic::model::Severity;

/// Classify evidence with the fixed rule table.
///
/// 1. timing features present → Reconnaissance/Scanning, Medium
/// 2. throughput features present → DoS-like Behavior, High when severity
///    is High or Medium, otherwise Low
/// 3. otherwise Unknown/Unclassified, Low
pub fn classify(evidence: &Evidence, severity: Severity) -> Hypothesis {
    let timing = evidence.intersect(TIMING_FEATURES);
    if !timing.is_empty() {
        return Hypothesis {
            label: LABEL_RECON.to_string(),
            confidence: Confidence::Medium,
            reasons: vec![
                "Unusual inter-arrival times suggest probing or scanning behavior.".to_string(),
                format!("Timing indicators in evidence: {}", timing.join(", ")),
            ],
            strategy: HypothesisStrategy::RuleTable,
        };
    }

    let throughput = evidence.intersect(THROUGHPUT_FEATURES);
    if !throughput.is_empty() {
        let confidence = match severity {
            Severity::High | Severity::Medium => Confidence::High,
            Severity::Low => Confidence::Low,
        };
        return Hypothesis {
            label: LABEL_DOS.to_string(),
            confidence,
            reasons: vec![
                "High traffic volume or packet rate indicates possible flooding or denial-of-service behavior."
                    .to_string(),
                format!("Throughput indicators in evidence: {}", throughput.join(", ")),
                format!("Severity {} sets confidence {}", severity, confidence),
            ],
            strategy: HypothesisStrategy::RuleTable,
        };
    }

    Hypothesis::unknown(
        HypothesisStrategy::RuleTable,
        "The observed behavior does not clearly match known attack patterns; more context is needed.",
    )
}
