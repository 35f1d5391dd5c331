//! Explain Module - evidence extraction and analyst-facing explanation

pub mod assistant;
pub mod engine;
pub mod playbook;
pub mod types;

pub use assistant::{explain_alert, render_explanation};
pub use engine::{extract_evidence, top_features};
pub use playbook::playbook;
pub use types::{AssistantReport, FeatureContribution, Playbook};
