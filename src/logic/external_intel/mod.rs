//! External Intelligence Module - static knowledge lookups
//!
//! Keyed by hypothesis label. Lookups never affect the triage decision.
//!
//! # Components
//! - `mitre.rs`: MITRE ATT&CK technique table and label mapping
//! - `controls.rs`: NCA ECC control recommendations

pub mod controls;
pub mod mitre;
pub mod types;

pub use types::{AttackFamily, ComplianceControl, KnowledgeContext, MitreTactic, MitreTechnique};

pub use controls::{control_for_family, control_for_label};
pub use mitre::{get_technique, techniques_for_label, MITRE_TECHNIQUES};

/// Techniques and control recommendation for one label
pub fn lookup(label: &str) -> KnowledgeContext {
    KnowledgeContext {
        label: label.to_string(),
        techniques: techniques_for_label(label),
        control: control_for_label(label),
    }
}
