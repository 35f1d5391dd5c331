//! Batch Triage
//!
//! `TriageContext` owns every loaded artifact and is immutable after
//! construction; share it by reference (it is `Send + Sync`).
//!
//! Scoring runs in two phases separated by a barrier:
//! 1. normalize the batch and score every row (parallel over rows)
//! 2. compute the batch threshold from the successful primary scores,
//!    then band each row
//!
//! Alerts are assembled lazily, one row at a time, from the scored batch.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{DetectorDegradedWarning, PrimaryScoreUnavailableError, Result, TriageError};
use crate::logic::alert::{assemble, Alert, AlertParts};
use crate::logic::config::TriageConfig;
use crate::logic::explain::extract_evidence;
use crate::logic::features::{normalize_batch, FeatureSchema, NormalizedBatch, RawRow, StandardScaler};
use crate::logic::ingest::IngestedBatch;
use crate::logic::model::{
    load_json, ArtifactManifest, BatchThreshold, ClusterPolicy, Ensemble, EnsembleDecision,
    IsolationForest, KMeans, LocalOutlierFactor, RowStatus, Severity, ThresholdStats,
};
use crate::logic::threat::classify;

// ============================================================================
// CONTEXT
// ============================================================================

pub struct TriageContext {
    config: TriageConfig,
    schema: FeatureSchema,
    scaler: StandardScaler,
    ensemble: Ensemble,
}

fn structural(path: &Path, result: std::result::Result<(), String>) -> Result<()> {
    result.map_err(|e| TriageError::artifact(path.display().to_string(), e))
}

impl TriageContext {
    /// Load every artifact from `config.model_dir` (once per process)
    pub fn load(config: TriageConfig) -> Result<Self> {
        config.validate()?;
        let dir = config.model_dir.clone();
        log::info!("Loading model artifacts from {}", dir.display());

        if let Some(manifest) = ArtifactManifest::load_optional(&dir)? {
            manifest.verify(&dir)?;
        }

        let schema = FeatureSchema::from_file(&dir.join(FEATURE_COLUMNS_FILE))?;
        let scaler: StandardScaler = load_json(&dir.join(SCALER_FILE))?;

        let forest_path = dir.join(ISOLATION_FOREST_FILE);
        let forest: IsolationForest = load_json(&forest_path)?;
        structural(&forest_path, forest.validate())?;

        let lof_path = dir.join(LOF_FILE);
        let lof: LocalOutlierFactor = load_json(&lof_path)?;
        structural(&lof_path, lof.validate())?;
        if !lof.novelty {
            log::warn!("LOF model was not fitted with novelty=true; its vote will always be degraded");
        }

        let kmeans_path = dir.join(KMEANS_FILE);
        let kmeans: KMeans = load_json(&kmeans_path)?;
        structural(&kmeans_path, kmeans.validate())?;

        let policy = config.cluster_policy;
        let context = Self::new(config, schema, scaler, Ensemble::new(forest, lof, kmeans, policy))?;

        log::info!(
            "Triage context ready: {} features, layout {:08x}, cluster policy {}",
            context.schema.len(),
            context.schema.layout_hash(),
            policy
        );
        Ok(context)
    }

    /// Assemble from already-loaded parts; runs the same load-time checks
    pub fn new(
        config: TriageConfig,
        schema: FeatureSchema,
        scaler: StandardScaler,
        ensemble: Ensemble,
    ) -> Result<Self> {
        config.validate()?;
        scaler.validate(&schema)?;
        ensemble
            .check_structure()
            .map_err(|(kind, e)| TriageError::artifact(kind.as_str(), e))?;

        if ensemble.primary_features() != schema.len() {
            return Err(TriageError::InvalidConfig(format!(
                "primary detector expects {} features, schema has {}",
                ensemble.primary_features(),
                schema.len()
            )));
        }
        if let ClusterPolicy::Fixed(cluster) = ensemble.policy() {
            if cluster >= ensemble.n_clusters() {
                return Err(TriageError::InvalidConfig(format!(
                    "fixed cluster {} does not exist ({} clusters)",
                    cluster,
                    ensemble.n_clusters()
                )));
            }
        }

        Ok(Self {
            config,
            schema,
            scaler,
            ensemble,
        })
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Score raw rows (no labels)
    pub fn score_batch(&self, rows: &[RawRow]) -> Result<ScoredBatch<'_>> {
        self.score_with_labels(rows, &[])
    }

    /// Score an ingested batch, carrying its labels into the row reports
    pub fn score_ingested(&self, batch: &IngestedBatch) -> Result<ScoredBatch<'_>> {
        self.score_with_labels(&batch.rows, &batch.labels)
    }

    fn score_with_labels(&self, rows: &[RawRow], labels: &[Option<String>]) -> Result<ScoredBatch<'_>> {
        let normalized = normalize_batch(rows, &self.schema, &self.scaler)?;
        let row_scores = self.ensemble.score_batch(&normalized);

        // Barrier: the threshold needs the whole population
        let population: Vec<f64> = row_scores
            .iter()
            .filter_map(|r| r.decision.as_ref().map(|d| d.primary_score))
            .collect();
        if population.is_empty() {
            return Err(TriageError::EmptyPopulation { rows: rows.len() });
        }
        let threshold = BatchThreshold::from_population(&population, self.config.quantile)?;

        let reports: Vec<RowReport> = row_scores
            .into_iter()
            .map(|score| {
                let (is_anomaly, severity) = match &score.decision {
                    Some(d) => (
                        Some(threshold.is_anomaly(d.primary_score)),
                        Some(threshold.severity(d.primary_score)),
                    ),
                    None => (None, None),
                };
                RowReport {
                    label: labels.get(score.row).cloned().flatten(),
                    row: score.row,
                    status: score.status,
                    decision: score.decision,
                    is_anomaly,
                    severity,
                    degradations: score.degradations,
                    failure: score.failure,
                }
            })
            .collect();

        let batch = ScoredBatch {
            context: self,
            normalized,
            threshold,
            reports,
        };

        let summary = batch.summary();
        log::info!(
            "Scored {} rows: threshold={:.4} (q={}), {} flagged by threshold, {} by vote, {} degraded, {} failed",
            summary.rows,
            threshold.value,
            threshold.quantile,
            summary.flagged_by_threshold,
            summary.flagged_by_vote,
            summary.degraded,
            summary.failed
        );
        Ok(batch)
    }
}

impl std::fmt::Debug for TriageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriageContext")
            .field("features", &self.schema.len())
            .field("layout_hash", &self.schema.layout_hash())
            .field("ensemble", &self.ensemble)
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// SCORED BATCH
// ============================================================================

/// Per-row outcome within one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowReport {
    pub row: usize,
    pub status: RowStatus,
    pub decision: Option<EnsembleDecision>,
    /// primary score ≤ batch threshold
    pub is_anomaly: Option<bool>,
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degradations: Vec<DetectorDegradedWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<PrimaryScoreUnavailableError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub complete: usize,
    pub degraded: usize,
    pub failed: usize,
    pub flagged_by_threshold: usize,
    pub flagged_by_vote: usize,
    pub imputed_cells: usize,
    pub threshold: BatchThreshold,
    pub scores: Option<ThresholdStats>,
}

pub struct ScoredBatch<'a> {
    context: &'a TriageContext,
    normalized: NormalizedBatch,
    threshold: BatchThreshold,
    reports: Vec<RowReport>,
}

impl std::fmt::Debug for ScoredBatch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoredBatch")
            .field("threshold", &self.threshold)
            .field("rows", &self.reports.len())
            .field("imputed_cells", &self.normalized.imputed_cells)
            .finish()
    }
}

impl<'a> ScoredBatch<'a> {
    pub fn threshold(&self) -> &BatchThreshold {
        &self.threshold
    }

    pub fn reports(&self) -> &[RowReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Rows at or below the threshold, in input order
    pub fn flagged_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.reports
            .iter()
            .filter(|r| r.is_anomaly == Some(true))
            .map(|r| r.row)
    }

    pub fn summary(&self) -> BatchSummary {
        let count = |status: RowStatus| self.reports.iter().filter(|r| r.status == status).count();
        let scores: Vec<f64> = self
            .reports
            .iter()
            .filter_map(|r| r.decision.as_ref().map(|d| d.primary_score))
            .collect();

        BatchSummary {
            rows: self.reports.len(),
            complete: count(RowStatus::Complete),
            degraded: count(RowStatus::Degraded),
            failed: count(RowStatus::Failed),
            flagged_by_threshold: self.flagged_rows().count(),
            flagged_by_vote: self
                .reports
                .iter()
                .filter(|r| r.decision.as_ref().is_some_and(|d| d.is_anomaly))
                .count(),
            imputed_cells: self.normalized.imputed_cells,
            threshold: self.threshold,
            scores: ThresholdStats::from_scores(&scores),
        }
    }

    /// Assemble the alert for one row
    pub fn alert(&self, row: usize, timestamp: DateTime<Utc>) -> Result<Alert> {
        let report = self.reports.get(row).ok_or(TriageError::RowOutOfRange {
            row,
            len: self.reports.len(),
        })?;

        let decision = report.decision.as_ref().ok_or_else(|| TriageError::RowNotScored {
            row,
            reason: report
                .failure
                .as_ref()
                .map(|f| f.reason.clone())
                .unwrap_or_else(|| "no decision".to_string()),
        })?;

        let vector = self.normalized.vector(row).ok_or_else(|| TriageError::RowNotScored {
            row,
            reason: "normalized row contains non-finite values".to_string(),
        })?;

        let schema = self.context.schema();
        let evidence = extract_evidence(&vector, schema, self.context.config.top_k);
        let hypothesis = classify(&evidence, self.threshold.severity(decision.primary_score));

        Ok(assemble(
            AlertParts {
                row,
                source: &self.context.config.source_tag,
                decision,
                threshold: &self.threshold,
                evidence,
                hypothesis: &hypothesis,
                degradations: &report.degradations,
                label: report.label.as_deref(),
            },
            timestamp,
        ))
    }
}
