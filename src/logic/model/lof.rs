//! Local Outlier Factor - density-based secondary detector
//!
//! Novelty mode only: the model keeps its training reference set together
//! with each reference point's k-distance and local reachability density.
//! A model exported with `novelty = false` cannot score unseen rows.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use super::detector::{check_row, Assessment, Detector, DetectorKind};
use crate::error::DetectorError;

/// Guards against division by zero for duplicated points
const LRD_EPSILON: f64 = 1e-10;

/// Fitted LOF model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalOutlierFactor {
    pub n_neighbors: usize,
    pub novelty: bool,
    pub offset: f64,
    /// Training points (already scaled)
    pub reference: Vec<Vec<f64>>,
    /// Distance from each reference point to its k-th neighbor
    pub k_distance: Vec<f64>,
    /// Local reachability density of each reference point
    pub lrd: Vec<f64>,
}

fn euclidean(a: &ArrayView1<'_, f64>, b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

impl LocalOutlierFactor {
    pub fn validate(&self) -> Result<(), String> {
        if self.reference.is_empty() {
            return Err("reference set is empty".to_string());
        }
        if self.n_neighbors == 0 {
            return Err("n_neighbors must be positive".to_string());
        }
        let dim = self.reference[0].len();
        if self.reference.iter().any(|p| p.len() != dim) {
            return Err("reference points differ in dimension".to_string());
        }
        if self.k_distance.len() != self.reference.len() || self.lrd.len() != self.reference.len() {
            return Err("k_distance / lrd length differs from reference set".to_string());
        }
        Ok(())
    }

    fn effective_k(&self) -> usize {
        self.n_neighbors.min(self.reference.len())
    }

    /// Indices and distances of the k nearest reference points
    fn neighbors(&self, row: &ArrayView1<'_, f64>) -> Vec<(usize, f64)> {
        let mut distances: Vec<(usize, f64)> = self
            .reference
            .iter()
            .enumerate()
            .map(|(i, point)| (i, euclidean(row, point)))
            .collect();

        distances.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        distances.truncate(self.effective_k());
        distances
    }

    /// Negated LOF: around -1 for inliers, much lower for outliers
    pub fn score_samples(&self, row: ArrayView1<'_, f64>) -> Result<f64, DetectorError> {
        if !self.novelty {
            return Err(DetectorError::Unsupported(
                "decision_function requires a model fitted with novelty=true".to_string(),
            ));
        }
        let dim = self
            .reference
            .first()
            .map(Vec::len)
            .ok_or(DetectorError::EmptyModel("reference points"))?;
        check_row(&row, dim)?;

        let neighbors = self.neighbors(&row);
        if neighbors.is_empty() {
            return Err(DetectorError::EmptyModel("reference points"));
        }

        let reach_sum: f64 = neighbors
            .iter()
            .map(|&(i, d)| d.max(self.k_distance[i]))
            .sum();
        let row_lrd = 1.0 / (reach_sum / neighbors.len() as f64 + LRD_EPSILON);

        let ratio_sum: f64 = neighbors.iter().map(|&(i, _)| self.lrd[i] / row_lrd).sum();
        let score = -(ratio_sum / neighbors.len() as f64);

        if !score.is_finite() {
            return Err(DetectorError::NonFinite);
        }
        Ok(score)
    }

    pub fn decision_function(&self, row: ArrayView1<'_, f64>) -> Result<f64, DetectorError> {
        Ok(self.score_samples(row)? - self.offset)
    }
}

impl Detector for LocalOutlierFactor {
    fn kind(&self) -> DetectorKind {
        DetectorKind::LocalOutlier
    }

    fn n_features(&self) -> usize {
        self.reference.first().map(Vec::len).unwrap_or(0)
    }

    fn check_structure(&self) -> Result<(), String> {
        self.validate()
    }

    fn assess(&self, row: ArrayView1<'_, f64>) -> Result<Assessment, DetectorError> {
        let score = self.decision_function(row)?;
        Ok(Assessment::Scored {
            score,
            anomalous: score < 0.0,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ndarray::array;

    /// Unit square corners: k=2, every k-distance is 1, every lrd is 1
    pub(crate) fn square_lof() -> LocalOutlierFactor {
        LocalOutlierFactor {
            n_neighbors: 2,
            novelty: true,
            offset: -1.5,
            reference: vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 1.0],
            ],
            k_distance: vec![1.0; 4],
            lrd: vec![1.0; 4],
        }
    }

    #[test]
    fn test_inlier_and_outlier() {
        let lof = square_lof();
        lof.validate().unwrap();

        let inlier = lof.decision_function(array![0.5, 0.5].view()).unwrap();
        let outlier = lof.decision_function(array![10.0, 10.0].view()).unwrap();

        assert!(inlier > 0.0, "inlier decision {inlier}");
        assert!(outlier < 0.0, "outlier decision {outlier}");
    }

    #[test]
    fn test_non_novelty_model_is_unsupported() {
        let lof = LocalOutlierFactor {
            novelty: false,
            ..square_lof()
        };
        let err = lof.assess(array![0.5, 0.5].view()).unwrap_err();
        assert!(matches!(err, DetectorError::Unsupported(_)));
    }

    #[test]
    fn test_incompatible_feature_count() {
        let err = square_lof().assess(array![0.5, 0.5, 0.5].view()).unwrap_err();
        assert_eq!(err, DetectorError::FeatureCount { expected: 2, actual: 3 });
    }
}
