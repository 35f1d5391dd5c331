//! Knowledge Lookup Types

use serde::{Deserialize, Serialize};

// ============================================================================
// MITRE ATT&CK TYPES
// ============================================================================

/// MITRE ATT&CK Technique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitreTechnique {
    pub id: String,   // "T1498"
    pub name: String, // "Network Denial of Service"
    pub tactic: MitreTactic,
    pub description: String,
    pub url: String,
    pub sub_techniques: Vec<String>,
}

/// MITRE ATT&CK Tactic (network-relevant subset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MitreTactic {
    Reconnaissance,
    Discovery,
    CredentialAccess,
    CommandAndControl,
    Exfiltration,
    Impact,
}

impl MitreTactic {
    pub fn as_str(&self) -> &'static str {
        match self {
            MitreTactic::Reconnaissance => "Reconnaissance",
            MitreTactic::Discovery => "Discovery",
            MitreTactic::CredentialAccess => "Credential Access",
            MitreTactic::CommandAndControl => "Command and Control",
            MitreTactic::Exfiltration => "Exfiltration",
            MitreTactic::Impact => "Impact",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            MitreTactic::Reconnaissance => "TA0043",
            MitreTactic::Discovery => "TA0007",
            MitreTactic::CredentialAccess => "TA0006",
            MitreTactic::CommandAndControl => "TA0011",
            MitreTactic::Exfiltration => "TA0010",
            MitreTactic::Impact => "TA0040",
        }
    }
}

// ============================================================================
// COMPLIANCE CONTROLS
// ============================================================================

/// Coarse attack family used to key control recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackFamily {
    DoS,
    BruteForce,
    Scanning,
    Normal,
    Other,
}

impl AttackFamily {
    /// Keyword match on a hypothesis label (case-insensitive)
    pub fn from_label(label: &str) -> Self {
        let l = label.to_lowercase();
        if l.contains("dos") || l.contains("flood") {
            AttackFamily::DoS
        } else if l.contains("brute") {
            AttackFamily::BruteForce
        } else if l.contains("scan") || l.contains("recon") || l.contains("port") {
            AttackFamily::Scanning
        } else if l == "normal" || l == "benign" {
            AttackFamily::Normal
        } else {
            AttackFamily::Other
        }
    }
}

/// NCA ECC-style control recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceControl {
    pub id: String,
    pub domain: String,
    pub recommendation: String,
}

/// Knowledge attached to one hypothesis label
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeContext {
    pub label: String,
    pub techniques: Vec<MitreTechnique>,
    pub control: ComplianceControl,
}
