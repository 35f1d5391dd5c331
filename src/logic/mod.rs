//! Logic Module - triage pipeline
//!
//! Data flows strictly forward:
//! raw row → normalized vector → ensemble decision → threshold/severity
//! → evidence → hypothesis → alert.
//!
//! ## Layout
//! - `features/` - schema, scaler, batch normalization
//! - `model/` - detectors, vote fusion, quantile threshold
//! - `threat/` - attack hypotheses
//! - `explain/` - evidence, playbook, explanation
//! - `external_intel/` - MITRE / NCA ECC lookups
//! - `alert/` - alert records

pub mod alert;
pub mod analysis;
pub mod config;
pub mod explain;
pub mod external_intel;
pub mod features;
pub mod ingest;
pub mod model;
pub mod threat;

#[cfg(test)]
mod tests;

pub use analysis::{BatchSummary, RowReport, ScoredBatch, TriageContext};
pub use config::TriageConfig;
