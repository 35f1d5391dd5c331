//! Detector trait
//!
//! A detector assesses one normalized row at a time. Scoring detectors return
//! a continuous score plus their own anomaly flag; partitioning detectors
//! return a cluster id that the ensemble resolves against a batch policy.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::DetectorError;

/// The three detector kinds fused by the ensemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// Tree-ensemble isolation score (primary, mandatory)
    IsolationForest,
    /// Density-based local outlier score
    LocalOutlier,
    /// Partition / clustering membership
    Clustering,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::IsolationForest => "isolation_forest",
            DetectorKind::LocalOutlier => "local_outlier",
            DetectorKind::Clustering => "clustering",
        }
    }

}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of one detector on one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assessment {
    /// Continuous score (lower = more anomalous) and the detector's own flag
    Scored { score: f64, anomalous: bool },
    /// Cluster membership, resolved to a flag by the ensemble
    Assigned { cluster: usize },
}

/// Trait for loaded, read-only detectors
pub trait Detector: Send + Sync {
    fn kind(&self) -> DetectorKind;

    /// Number of features the model was fitted on
    fn n_features(&self) -> usize;

    fn assess(&self, row: ArrayView1<'_, f64>) -> Result<Assessment, DetectorError>;

    /// Internal consistency of the fitted model; scoring may index out of
    /// bounds on a model that fails this
    fn check_structure(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Shared input guard: feature count and finiteness
pub(crate) fn check_row(row: &ArrayView1<'_, f64>, expected: usize) -> Result<(), DetectorError> {
    if row.len() != expected {
        return Err(DetectorError::FeatureCount {
            expected,
            actual: row.len(),
        });
    }
    if row.iter().any(|v| !v.is_finite()) {
        return Err(DetectorError::NonFinite);
    }
    Ok(())
}
