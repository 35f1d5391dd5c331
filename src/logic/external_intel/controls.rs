//! NCA ECC Control Mapping
//!
//! Attack family → Essential Cybersecurity Controls (ECC-2) recommendation.
//! Families without a specific control fall back to incident management.

use std::collections::HashMap;
use once_cell::sync::Lazy;

use super::types::{AttackFamily, ComplianceControl};

/// Generic incident-management control
pub const FALLBACK_CONTROL_ID: &str = "ECC-2-14-1";

static CONTROLS: Lazy<HashMap<AttackFamily, ComplianceControl>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert(AttackFamily::DoS, ComplianceControl {
        id: "ECC-2-12-1".to_string(),
        domain: "Network Security".to_string(),
        recommendation: "Protect network boundaries and data flows.".to_string(),
    });

    m.insert(AttackFamily::BruteForce, ComplianceControl {
        id: "ECC-2-13-1".to_string(),
        domain: "Event Logs and Monitoring".to_string(),
        recommendation: "Monitor failed login attempts.".to_string(),
    });

    m.insert(AttackFamily::Normal, ComplianceControl {
        id: "ECC-1-1-2".to_string(),
        domain: "Cybersecurity Governance".to_string(),
        recommendation: "Adhere to the general cybersecurity policies.".to_string(),
    });

    m
});

fn fallback() -> ComplianceControl {
    ComplianceControl {
        id: FALLBACK_CONTROL_ID.to_string(),
        domain: "Incident Management".to_string(),
        recommendation: "Review the incident response controls.".to_string(),
    }
}

pub fn control_for_family(family: AttackFamily) -> ComplianceControl {
    CONTROLS.get(&family).cloned().unwrap_or_else(fallback)
}

pub fn control_for_label(label: &str) -> ComplianceControl {
    control_for_family(AttackFamily::from_label(label))
}
