//! Alert Assembler
//!
//! Pure composition: no recomputation, no clock reads, no I/O. The caller
//! supplies the timestamp so the same inputs always give the same alert.

use chrono::{DateTime, Utc};

use super::types::{Alert, AlertDecision, EnsembleBlock, EvidenceBlock, HypothesisBlock, MlBlock};
use crate::constants::PRIMARY_MODEL_NAME;
use crate::error::DetectorDegradedWarning;
use crate::logic::model::{BatchThreshold, EnsembleDecision};
use crate::logic::threat::{Evidence, Hypothesis};

pub const SUMMARY_SUSPICIOUS: &str = "Suspicious network behavior detected";
pub const SUMMARY_NORMAL: &str = "Normal traffic pattern";

/// Everything an alert is built from
#[derive(Debug, Clone)]
pub struct AlertParts<'a> {
    pub row: usize,
    pub source: &'a str,
    pub decision: &'a EnsembleDecision,
    pub threshold: &'a BatchThreshold,
    pub evidence: Evidence,
    pub hypothesis: &'a Hypothesis,
    pub degradations: &'a [DetectorDegradedWarning],
    pub label: Option<&'a str>,
}

pub fn assemble(parts: AlertParts<'_>, timestamp: DateTime<Utc>) -> Alert {
    let score = parts.decision.primary_score;
    let flagged = parts.threshold.is_anomaly(score);

    Alert {
        timestamp,
        source: parts.source.to_string(),
        summary: if flagged { SUMMARY_SUSPICIOUS } else { SUMMARY_NORMAL }.to_string(),
        row: parts.row,
        ml: MlBlock {
            model: PRIMARY_MODEL_NAME.to_string(),
            score,
            threshold: parts.threshold.value,
            decision: if flagged {
                AlertDecision::Anomaly
            } else {
                AlertDecision::Normal
            },
            severity: parts.threshold.severity(score),
            ensemble: EnsembleBlock {
                votes: parts.decision.votes,
                is_anomaly: parts.decision.is_anomaly,
                verdicts: parts.decision.verdicts.clone(),
            },
            degradations: parts.degradations.to_vec(),
        },
        evidence: EvidenceBlock {
            top_features: parts.evidence,
        },
        hypothesis: HypothesisBlock::from(parts.hypothesis),
        label: parts.label.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::Severity;
    use crate::logic::threat::{classify, Confidence};
    use chrono::TimeZone;

    #[test]
    fn test_assemble_json_shape() {
        let threshold = BatchThreshold {
            value: 0.04,
            quantile: 0.2,
            population: 5,
        };
        let decision = EnsembleDecision::from_verdicts(-0.2, Vec::new());
        let evidence = Evidence::new(vec!["Flow Bytes/s".to_string(), "Destination Port".to_string()]);
        let hypothesis = classify(&evidence, threshold.severity(-0.2));
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let alert = assemble(
            AlertParts {
                row: 4,
                source: "network_flow",
                decision: &decision,
                threshold: &threshold,
                evidence,
                hypothesis: &hypothesis,
                degradations: &[],
                label: Some("DDoS"),
            },
            ts,
        );

        assert!(alert.is_anomaly());
        assert_eq!(alert.ml.severity, Severity::High);
        assert_eq!(alert.hypothesis.confidence, Confidence::High);

        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(json["source"], "network_flow");
        assert_eq!(json["summary"], SUMMARY_SUSPICIOUS);
        assert_eq!(json["ml"]["model"], "Isolation Forest");
        assert_eq!(json["ml"]["decision"], "anomaly");
        assert_eq!(json["ml"]["severity"], "High");
        assert_eq!(json["evidence"]["top_features"][0], "Flow Bytes/s");
        assert_eq!(json["hypothesis"]["label"], "DoS-like Behavior");
        assert_eq!(json["hypothesis"]["confidence"], "High");
        assert!(json["hypothesis"]["reason"].as_str().unwrap().contains("flooding"));
        assert!(json["ml"].get("degradations").is_none());
        assert_eq!(json["label"], "DDoS");
    }

    #[test]
    fn test_normal_row_summary() {
        let threshold = BatchThreshold {
            value: 0.04,
            quantile: 0.2,
            population: 5,
        };
        let decision = EnsembleDecision::from_verdicts(0.1, Vec::new());
        let hypothesis = classify(&Evidence::default(), Severity::Low);
        let alert = assemble(
            AlertParts {
                row: 3,
                source: "network_flow",
                decision: &decision,
                threshold: &threshold,
                evidence: Evidence::default(),
                hypothesis: &hypothesis,
                degradations: &[],
                label: None,
            },
            Utc::now(),
        );
        assert_eq!(alert.summary, SUMMARY_NORMAL);
        assert_eq!(alert.ml.decision, AlertDecision::Normal);
        assert_eq!(alert.ml.severity, Severity::Low);
    }
}
