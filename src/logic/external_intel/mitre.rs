//! MITRE ATT&CK Mapping
//!
//! Static technique table plus a keyword map from hypothesis labels to
//! technique ids.

use std::collections::HashMap;
use once_cell::sync::Lazy;

use super::types::{MitreTactic, MitreTechnique};

// ============================================================================
// MITRE TECHNIQUE DATABASE
// ============================================================================

/// Network-flow relevant techniques
pub static MITRE_TECHNIQUES: Lazy<HashMap<&'static str, MitreTechnique>> = Lazy::new(|| {
    let mut m = HashMap::new();

    // Reconnaissance / Discovery
    m.insert("T1595", MitreTechnique {
        id: "T1595".to_string(),
        name: "Active Scanning".to_string(),
        tactic: MitreTactic::Reconnaissance,
        description: "Adversaries may execute active reconnaissance scans to gather information that can be used during targeting.".to_string(),
        url: "https://attack.mitre.org/techniques/T1595/".to_string(),
        sub_techniques: vec!["T1595.001".to_string()],
    });

    m.insert("T1595.001", MitreTechnique {
        id: "T1595.001".to_string(),
        name: "Scanning IP Blocks".to_string(),
        tactic: MitreTactic::Reconnaissance,
        description: "Adversaries may scan victim IP blocks to gather information that can be used during targeting.".to_string(),
        url: "https://attack.mitre.org/techniques/T1595/001/".to_string(),
        sub_techniques: vec![],
    });

    m.insert("T1046", MitreTechnique {
        id: "T1046".to_string(),
        name: "Network Service Discovery".to_string(),
        tactic: MitreTactic::Discovery,
        description: "Adversaries may attempt to get a listing of services running on remote hosts, including those that may be vulnerable to remote software exploitation.".to_string(),
        url: "https://attack.mitre.org/techniques/T1046/".to_string(),
        sub_techniques: vec![],
    });

    // Impact
    m.insert("T1498", MitreTechnique {
        id: "T1498".to_string(),
        name: "Network Denial of Service".to_string(),
        tactic: MitreTactic::Impact,
        description: "Adversaries may perform Network Denial of Service attacks to degrade or block the availability of targeted resources to users.".to_string(),
        url: "https://attack.mitre.org/techniques/T1498/".to_string(),
        sub_techniques: vec!["T1498.001".to_string()],
    });

    m.insert("T1498.001", MitreTechnique {
        id: "T1498.001".to_string(),
        name: "Direct Network Flood".to_string(),
        tactic: MitreTactic::Impact,
        description: "Adversaries may attempt to cause a denial of service by directly sending a high-volume of network traffic to a target.".to_string(),
        url: "https://attack.mitre.org/techniques/T1498/001/".to_string(),
        sub_techniques: vec![],
    });

    m.insert("T1499", MitreTechnique {
        id: "T1499".to_string(),
        name: "Endpoint Denial of Service".to_string(),
        tactic: MitreTactic::Impact,
        description: "Adversaries may perform Endpoint Denial of Service attacks to degrade or block the availability of services to users.".to_string(),
        url: "https://attack.mitre.org/techniques/T1499/".to_string(),
        sub_techniques: vec![],
    });

    // Credential Access
    m.insert("T1110", MitreTechnique {
        id: "T1110".to_string(),
        name: "Brute Force".to_string(),
        tactic: MitreTactic::CredentialAccess,
        description: "Adversaries may use brute force techniques to gain access to accounts when passwords are unknown.".to_string(),
        url: "https://attack.mitre.org/techniques/T1110/".to_string(),
        sub_techniques: vec![],
    });

    // Command and Control
    m.insert("T1071", MitreTechnique {
        id: "T1071".to_string(),
        name: "Application Layer Protocol".to_string(),
        tactic: MitreTactic::CommandAndControl,
        description: "Adversaries may communicate using application layer protocols to avoid detection by blending in with existing traffic.".to_string(),
        url: "https://attack.mitre.org/techniques/T1071/".to_string(),
        sub_techniques: vec![],
    });

    // Exfiltration
    m.insert("T1029", MitreTechnique {
        id: "T1029".to_string(),
        name: "Scheduled Transfer".to_string(),
        tactic: MitreTactic::Exfiltration,
        description: "Adversaries may schedule data exfiltration to be performed only at certain times of day or at certain intervals.".to_string(),
        url: "https://attack.mitre.org/techniques/T1029/".to_string(),
        sub_techniques: vec![],
    });

    m
});

// ============================================================================
// LABEL → TECHNIQUE MAPPING
// ============================================================================

/// Lowercase label keyword → technique ids (first matching keyword wins)
static LABEL_TO_MITRE: &[(&str, &[&str])] = &[
    ("dos", &["T1498", "T1498.001", "T1499"]),
    ("flood", &["T1498", "T1498.001"]),
    ("brute", &["T1110"]),
    ("scan", &["T1595", "T1046"]),
    ("recon", &["T1595"]),
    ("port", &["T1046"]),
    ("timing", &["T1071", "T1029"]),
    ("iat", &["T1071", "T1029"]),
];

/// Get technique by ID
pub fn get_technique(id: &str) -> Option<MitreTechnique> {
    MITRE_TECHNIQUES.get(id).cloned()
}

/// Techniques for a hypothesis label; empty for unknown/unclassified labels
pub fn techniques_for_label(label: &str) -> Vec<MitreTechnique> {
    let label_lower = label.to_lowercase();

    LABEL_TO_MITRE
        .iter()
        .find(|(keyword, _)| label_lower.contains(keyword))
        .map(|(_, ids)| ids.iter().filter_map(|id| get_technique(id)).collect())
        .unwrap_or_default()
}

// ============================================================================
// TESTS
// ============================================================================
