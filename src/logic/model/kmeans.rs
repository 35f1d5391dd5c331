//! K-Means - partitioning secondary detector
//!
//! The model only assigns rows to their nearest centroid. Which partition
//! counts as anomalous is decided by a `ClusterPolicy`, not learned.

use std::str::FromStr;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use super::detector::{check_row, Assessment, Detector, DetectorKind};
use crate::error::DetectorError;

/// Fitted centroids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeans {
    pub centroids: Vec<Vec<f64>>,
}

impl KMeans {
    pub fn validate(&self) -> Result<(), String> {
        if self.centroids.len() < 2 {
            return Err(format!(
                "need at least 2 centroids, found {}",
                self.centroids.len()
            ));
        }
        let dim = self.centroids[0].len();
        if dim == 0 || self.centroids.iter().any(|c| c.len() != dim) {
            return Err("centroids differ in dimension".to_string());
        }
        Ok(())
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    /// Nearest centroid (squared Euclidean), ties to the lowest index
    pub fn predict(&self, row: ArrayView1<'_, f64>) -> Result<usize, DetectorError> {
        let dim = self
            .centroids
            .first()
            .map(Vec::len)
            .ok_or(DetectorError::EmptyModel("centroids"))?;
        check_row(&row, dim)?;

        let mut best: Option<(usize, f64)> = None;
        for (i, centroid) in self.centroids.iter().enumerate() {
            let dist: f64 = row
                .iter()
                .zip(centroid.iter())
                .map(|(x, c)| (x - c).powi(2))
                .sum();
            if !dist.is_finite() {
                return Err(DetectorError::NonFinite);
            }
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((i, dist));
            }
        }

        best.map(|(i, _)| i).ok_or(DetectorError::EmptyModel("centroids"))
    }
}

impl Detector for KMeans {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Clustering
    }

    fn n_features(&self) -> usize {
        self.centroids.first().map(Vec::len).unwrap_or(0)
    }

    fn check_structure(&self) -> Result<(), String> {
        self.validate()
    }

    fn assess(&self, row: ArrayView1<'_, f64>) -> Result<Assessment, DetectorError> {
        Ok(Assessment::Assigned {
            cluster: self.predict(row)?,
        })
    }
}

// ============================================================================
// CLUSTER POLICY
// ============================================================================

/// Which cluster is treated as the anomalous one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterPolicy {
    /// The cluster with the fewest members in the current batch.
    /// Structural assumption: the rare partition is the attack-like one.
    #[default]
    BatchMinority,
    /// A fixed cluster id
    Fixed(usize),
}

impl ClusterPolicy {
    /// Resolve the anomalous cluster from the batch's successful assignments.
    ///
    /// Counts span all `n_clusters` (an empty cluster counts as 0 members);
    /// ties go to the lowest index. `None` when nothing was assigned.
    pub fn anomalous_cluster(&self, assignments: &[Option<usize>], n_clusters: usize) -> Option<usize> {
        match self {
            ClusterPolicy::Fixed(cluster) => Some(*cluster),
            ClusterPolicy::BatchMinority => {
                if n_clusters == 0 || assignments.iter().all(Option::is_none) {
                    return None;
                }
                let mut counts = vec![0usize; n_clusters];
                for cluster in assignments.iter().flatten() {
                    if let Some(count) = counts.get_mut(*cluster) {
                        *count += 1;
                    }
                }
                counts
                    .iter()
                    .enumerate()
                    .min_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(&b.0)))
                    .map(|(i, _)| i)
            }
        }
    }
}

impl FromStr for ClusterPolicy {
    type Err = String;

    /// `minority` or `fixed:<cluster>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "minority" || s == "batch_minority" {
            return Ok(ClusterPolicy::BatchMinority);
        }
        if let Some(id) = s.strip_prefix("fixed:") {
            return id
                .parse()
                .map(ClusterPolicy::Fixed)
                .map_err(|_| format!("invalid cluster id '{}'", id));
        }
        Err(format!("unknown cluster policy '{}'", s))
    }
}

impl std::fmt::Display for ClusterPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterPolicy::BatchMinority => write!(f, "minority"),
            ClusterPolicy::Fixed(id) => write!(f, "fixed:{}", id),
        }
    }
}
