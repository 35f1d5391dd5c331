//! Error Types
//!
//! Batch-level errors abort a scoring call. Per-row problems never do:
//! a failed primary detector becomes a `PrimaryScoreUnavailableError` on that
//! row, a failed secondary detector becomes a `DetectorDegradedWarning`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::model::DetectorKind;

/// Fatal errors for a whole batch (or for loading the context)
#[derive(Debug, Error)]
pub enum TriageError {
    /// Required schema columns absent from the input
    #[error("Missing required columns: {missing:?} ({total_missing} missing in total)")]
    SchemaMismatch {
        missing: Vec<String>,
        total_missing: usize,
    },

    #[error("Input batch is empty")]
    EmptyBatch,

    /// Every row lost its primary score, so no threshold exists
    #[error("No primary scores available: all {rows} rows failed")]
    EmptyPopulation { rows: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Artifact error ({path}): {message}")]
    Artifact { path: String, message: String },

    #[error("Row {row} out of range (batch has {len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("Row {row} has no primary score: {reason}")]
    RowNotScored { row: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TriageError {
    pub fn artifact(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Artifact {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable code for reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::EmptyBatch => "empty_batch",
            Self::EmptyPopulation { .. } => "empty_population",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Artifact { .. } => "artifact",
            Self::RowOutOfRange { .. } => "row_out_of_range",
            Self::RowNotScored { .. } => "row_not_scored",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;

/// Failure of a single detector on a single row
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorError {
    #[error("incompatible feature count: model expects {expected}, row has {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("operation not supported by this model: {0}")]
    Unsupported(String),

    #[error("non-finite value encountered")]
    NonFinite,

    #[error("model has no {0}")]
    EmptyModel(&'static str),
}

impl DetectorError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::FeatureCount { .. } => "feature_count",
            Self::Unsupported(_) => "unsupported",
            Self::NonFinite => "non_finite",
            Self::EmptyModel(_) => "empty_model",
        }
    }
}

/// The primary detector could not score a row; fatal for that row only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("primary score unavailable for row {row}: {reason}")]
pub struct PrimaryScoreUnavailableError {
    pub row: usize,
    pub code: String,
    pub reason: String,
}

/// A secondary detector failed on a row; its vote was dropped to 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorDegradedWarning {
    pub detector: DetectorKind,
    pub row: usize,
    pub code: String,
    pub reason: String,
}

impl DetectorDegradedWarning {
    pub fn new(detector: DetectorKind, row: usize, err: &DetectorError) -> Self {
        Self {
            detector,
            row,
            code: err.code().to_string(),
            reason: err.to_string(),
        }
    }
}

impl std::fmt::Display for DetectorDegradedWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} degraded on row {} (vote set to 0): {}",
            self.detector, self.row, self.reason
        )
    }
}
