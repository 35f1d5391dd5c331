//! Ensemble Scorer - 2-of-3 majority vote
//!
//! Runs the three detectors on every row and fuses their binary verdicts.
//! The primary (isolation forest) score is mandatory: without it a row
//! fails. A secondary detector failing only drops its vote to 0 and is
//! recorded as a degradation.

use ndarray::ArrayView1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::detector::{Assessment, Detector, DetectorKind};
use super::kmeans::{ClusterPolicy, KMeans};
use super::isolation_forest::IsolationForest;
use super::lof::LocalOutlierFactor;
use crate::constants::MIN_VOTES;
use crate::error::{DetectorDegradedWarning, DetectorError, PrimaryScoreUnavailableError};
use crate::logic::features::NormalizedBatch;

// ============================================================================
// VERDICTS & DECISIONS
// ============================================================================

/// One detector's verdict on one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorVerdict {
    pub detector: DetectorKind,
    pub flag: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
    /// The detector failed and its vote was forced to 0
    pub degraded: bool,
}

impl DetectorVerdict {
    fn degraded(detector: DetectorKind) -> Self {
        Self {
            detector,
            flag: false,
            score: None,
            cluster: None,
            degraded: true,
        }
    }
}

/// Count votes; positive iff at least `MIN_VOTES` detectors flag
pub fn majority_vote(flags: &[bool]) -> (u8, bool) {
    let votes = flags.iter().filter(|f| **f).count() as u8;
    (votes, votes >= MIN_VOTES)
}

/// Fused per-row decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleDecision {
    /// Number of detectors flagging the row (0-3)
    pub votes: u8,
    /// votes ≥ 2
    pub is_anomaly: bool,
    /// Primary detector's continuous score (lower = more anomalous)
    pub primary_score: f64,
    pub verdicts: Vec<DetectorVerdict>,
}

impl EnsembleDecision {
    /// Pure function of the verdicts
    pub fn from_verdicts(primary_score: f64, verdicts: Vec<DetectorVerdict>) -> Self {
        let flags: Vec<bool> = verdicts.iter().map(|v| v.flag).collect();
        let (votes, is_anomaly) = majority_vote(&flags);
        Self {
            votes,
            is_anomaly,
            primary_score,
            verdicts,
        }
    }

    pub fn verdict(&self, kind: DetectorKind) -> Option<&DetectorVerdict> {
        self.verdicts.iter().find(|v| v.detector == kind)
    }
}

/// Outcome tag for a scored row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// All three detectors voted
    Complete,
    /// At least one secondary detector's vote was dropped to 0
    Degraded,
    /// The primary score is unavailable; no decision for this row
    Failed,
}

/// Ensemble result for one row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowScore {
    pub row: usize,
    pub status: RowStatus,
    pub decision: Option<EnsembleDecision>,
    pub degradations: Vec<DetectorDegradedWarning>,
    pub failure: Option<PrimaryScoreUnavailableError>,
}

// ============================================================================
// ENSEMBLE
// ============================================================================

/// The three loaded detectors plus the cluster policy (read-only)
pub struct Ensemble {
    primary: Box<dyn Detector>,
    density: Box<dyn Detector>,
    clustering: Box<dyn Detector>,
    n_clusters: usize,
    policy: ClusterPolicy,
}

struct RowAssessment {
    primary: Result<Assessment, DetectorError>,
    density: Result<Assessment, DetectorError>,
    cluster: Result<Assessment, DetectorError>,
}

fn expect_score(result: &Result<Assessment, DetectorError>) -> Result<(f64, bool), DetectorError> {
    match result {
        Ok(Assessment::Scored { score, anomalous }) => Ok((*score, *anomalous)),
        Ok(Assessment::Assigned { .. }) => Err(DetectorError::Unsupported(
            "expected a continuous score, got a cluster assignment".to_string(),
        )),
        Err(e) => Err(e.clone()),
    }
}

fn expect_cluster(result: &Result<Assessment, DetectorError>) -> Result<usize, DetectorError> {
    match result {
        Ok(Assessment::Assigned { cluster }) => Ok(*cluster),
        Ok(Assessment::Scored { .. }) => Err(DetectorError::Unsupported(
            "expected a cluster assignment, got a score".to_string(),
        )),
        Err(e) => Err(e.clone()),
    }
}

impl Ensemble {
    pub fn new(
        primary: IsolationForest,
        density: LocalOutlierFactor,
        clustering: KMeans,
        policy: ClusterPolicy,
    ) -> Self {
        let n_clusters = clustering.n_clusters();
        Self::from_detectors(
            Box::new(primary),
            Box::new(density),
            Box::new(clustering),
            n_clusters,
            policy,
        )
    }

    /// Assemble from arbitrary detector implementations
    pub fn from_detectors(
        primary: Box<dyn Detector>,
        density: Box<dyn Detector>,
        clustering: Box<dyn Detector>,
        n_clusters: usize,
        policy: ClusterPolicy,
    ) -> Self {
        Self {
            primary,
            density,
            clustering,
            n_clusters,
            policy,
        }
    }

    /// Structural check of every detector, first failure wins
    pub fn check_structure(&self) -> Result<(), (DetectorKind, String)> {
        for detector in [&self.primary, &self.density, &self.clustering] {
            detector
                .check_structure()
                .map_err(|e| (detector.kind(), e))?;
        }
        Ok(())
    }

    pub fn policy(&self) -> ClusterPolicy {
        self.policy
    }

    pub fn primary_features(&self) -> usize {
        self.primary.n_features()
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    fn assess_row(&self, row: ArrayView1<'_, f64>) -> RowAssessment {
        RowAssessment {
            primary: self.primary.assess(row),
            density: self.density.assess(row),
            cluster: self.clustering.assess(row),
        }
    }

    /// Score every row of a normalized batch.
    ///
    /// Detector calls run in parallel per row; the cluster policy needs the
    /// whole batch's assignments, so vote fusion happens afterwards.
    pub fn score_batch(&self, batch: &NormalizedBatch) -> Vec<RowScore> {
        let matrix = batch.matrix();
        let assessments: Vec<RowAssessment> = (0..batch.rows())
            .into_par_iter()
            .map(|i| self.assess_row(matrix.row(i)))
            .collect();

        let assignments: Vec<Option<usize>> = assessments
            .iter()
            .map(|a| expect_cluster(&a.cluster).ok())
            .collect();
        let anomalous_cluster = self.policy.anomalous_cluster(&assignments, self.n_clusters);

        assessments
            .iter()
            .enumerate()
            .map(|(row, assessment)| self.fuse(row, assessment, anomalous_cluster))
            .collect()
    }

    fn fuse(&self, row: usize, assessment: &RowAssessment, anomalous_cluster: Option<usize>) -> RowScore {
        let mut degradations = Vec::new();

        let density_verdict = match expect_score(&assessment.density) {
            Ok((score, flag)) => DetectorVerdict {
                detector: DetectorKind::LocalOutlier,
                flag,
                score: Some(score),
                cluster: None,
                degraded: false,
            },
            Err(e) => {
                let warning = DetectorDegradedWarning::new(DetectorKind::LocalOutlier, row, &e);
                log::warn!("{}", warning);
                degradations.push(warning);
                DetectorVerdict::degraded(DetectorKind::LocalOutlier)
            }
        };

        let cluster_verdict = match expect_cluster(&assessment.cluster) {
            Ok(cluster) => DetectorVerdict {
                detector: DetectorKind::Clustering,
                flag: anomalous_cluster == Some(cluster),
                score: None,
                cluster: Some(cluster),
                degraded: false,
            },
            Err(e) => {
                let warning = DetectorDegradedWarning::new(DetectorKind::Clustering, row, &e);
                log::warn!("{}", warning);
                degradations.push(warning);
                DetectorVerdict::degraded(DetectorKind::Clustering)
            }
        };

        let (primary_score, primary_flag) = match expect_score(&assessment.primary) {
            Ok(scored) => scored,
            Err(e) => {
                log::warn!("Row {}: primary detector failed: {}", row, e);
                return RowScore {
                    row,
                    status: RowStatus::Failed,
                    decision: None,
                    degradations,
                    failure: Some(PrimaryScoreUnavailableError {
                        row,
                        code: e.code().to_string(),
                        reason: e.to_string(),
                    }),
                };
            }
        };

        let primary_verdict = DetectorVerdict {
            detector: DetectorKind::IsolationForest,
            flag: primary_flag,
            score: Some(primary_score),
            cluster: None,
            degraded: false,
        };

        let decision = EnsembleDecision::from_verdicts(
            primary_score,
            vec![primary_verdict, density_verdict, cluster_verdict],
        );
        log::debug!(
            "Row {}: score={:.4} votes={} anomaly={}",
            row,
            primary_score,
            decision.votes,
            decision.is_anomaly
        );

        RowScore {
            row,
            status: if degradations.is_empty() {
                RowStatus::Complete
            } else {
                RowStatus::Degraded
            },
            decision: Some(decision),
            degradations,
            failure: None,
        }
    }
}

impl std::fmt::Debug for Ensemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ensemble")
            .field("primary", &self.primary.kind())
            .field("density", &self.density.kind())
            .field("clustering", &self.clustering.kind())
            .field("n_clusters", &self.n_clusters)
            .field("policy", &self.policy)
            .finish()
    }
}
