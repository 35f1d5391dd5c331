//! Siyaj Core - network flow anomaly triage
//!
//! Scores flow rows with a three-detector ensemble, bands them against a
//! per-batch quantile threshold and assembles explainable alerts.

pub mod cli;
pub mod constants;
pub mod error;
pub mod logic;

pub use error::{DetectorDegradedWarning, PrimaryScoreUnavailableError, Result, TriageError};
pub use logic::alert::Alert;
pub use logic::{BatchSummary, RowReport, ScoredBatch, TriageConfig, TriageContext};
