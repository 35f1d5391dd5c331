//! Isolation Forest - primary detector
//!
//! Anomalies are easier to isolate and thus have shorter path lengths in the
//! trees. Trees are stored as parallel node arrays (the layout scikit-learn
//! exports), so a fitted forest can be dumped to JSON without conversion.
//!
//! Score convention: `decision = score_samples - offset`, lower is more
//! anomalous, negative is flagged.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use super::detector::{check_row, Assessment, Detector, DetectorKind};
use crate::error::DetectorError;

/// Marker for "no child" in the node arrays
const LEAF: i64 = -1;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful BST search over `n` points (c(n))
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// A single isolation tree in array form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub n_node_samples: Vec<usize>,
}

impl IsolationTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Structural check; children must point forward so traversal terminates
    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.n_node_samples.len() != n
        {
            return Err("tree node arrays differ in length".to_string());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF && right == LEAF {
                continue;
            }
            if left == LEAF || right == LEAF {
                return Err(format!("node {} has a single child", node));
            }
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {} has invalid child {}", node, child));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {} splits on invalid feature {}", node, feature));
            }
        }
        Ok(())
    }

    /// Depth of the reached leaf plus c(samples in that leaf)
    fn path_length(&self, row: &ArrayView1<'_, f64>) -> f64 {
        let mut node = 0usize;
        let mut depth = 0usize;

        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
            depth += 1;
        }

        depth as f64 + average_path_length(self.n_node_samples[node])
    }
}

/// Fitted Isolation Forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    pub n_features_in: usize,
    /// Sub-sample size each tree was grown on
    pub max_samples: usize,
    /// Decision offset (-0.5 for the default contamination)
    pub offset: f64,
    pub trees: Vec<IsolationTree>,
}

impl IsolationForest {
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        if self.max_samples == 0 {
            return Err("max_samples must be positive".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features_in)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }

    /// Raw score in [-1, 0): `-2^(-E[h(x)] / c(max_samples))`
    pub fn score_samples(&self, row: ArrayView1<'_, f64>) -> Result<f64, DetectorError> {
        check_row(&row, self.n_features_in)?;
        if self.trees.is_empty() {
            return Err(DetectorError::EmptyModel("trees"));
        }

        let total: f64 = self.trees.iter().map(|t| t.path_length(&row)).sum();
        let mean_path = total / self.trees.len() as f64;

        let normalizer = average_path_length(self.max_samples);
        let exponent = if normalizer > 0.0 { -mean_path / normalizer } else { 0.0 };

        let score = -(2.0_f64.powf(exponent));
        if !score.is_finite() {
            return Err(DetectorError::NonFinite);
        }
        Ok(score)
    }

    /// Shifted score: negative = anomalous
    pub fn decision_function(&self, row: ArrayView1<'_, f64>) -> Result<f64, DetectorError> {
        Ok(self.score_samples(row)? - self.offset)
    }
}

impl Detector for IsolationForest {
    fn kind(&self) -> DetectorKind {
        DetectorKind::IsolationForest
    }

    fn n_features(&self) -> usize {
        self.n_features_in
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
