//! End-to-end triage scenarios
//!
//! Small hand-built artifacts: a one-split isolation forest, a unit-square
//! LOF reference set and two k-means centroids over a two-column schema.

#[cfg(test)]
mod scenario_tests {
    use chrono::{TimeZone, Utc};
    use ndarray::ArrayView1;

    use crate::constants::*;
    use crate::error::{DetectorError, TriageError};
    use crate::logic::alert::{assemble, AlertParts};
    use crate::logic::analysis::TriageContext;
    use crate::logic::config::TriageConfig;
    use crate::logic::features::{FeatureSchema, RawRow, StandardScaler};
    use crate::logic::ingest::parse_rows;
    use crate::logic::model::isolation_forest::tests::stump_forest;
    use crate::logic::model::kmeans::tests::two_centroids;
    use crate::logic::model::lof::tests::square_lof;
    use crate::logic::model::*;
    use crate::logic::threat::rules::{LABEL_DOS, LABEL_RECON};
    use crate::logic::threat::{classify, Confidence, Evidence};

    const BYTES: &str = "Flow Bytes/s";
    const PORT: &str = "Destination Port";

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![BYTES.to_string(), PORT.to_string()]).unwrap()
    }

    fn identity_scaler(schema: &FeatureSchema) -> StandardScaler {
        StandardScaler {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
            schema_hash: Some(schema.layout_hash()),
        }
    }

    fn context_with(lof: LocalOutlierFactor, config: TriageConfig) -> TriageContext {
        let schema = schema();
        let scaler = identity_scaler(&schema);
        let ensemble = Ensemble::new(stump_forest(2), lof, two_centroids(), config.cluster_policy);
        TriageContext::new(config, schema, scaler, ensemble).unwrap()
    }

    fn context() -> TriageContext {
        context_with(square_lof(), TriageConfig::default())
    }

    fn row(bytes: f64, port: f64) -> RawRow {
        let mut row = RawRow::new();
        row.insert(BYTES.to_string(), Some(bytes));
        row.insert(PORT.to_string(), Some(port));
        row
    }

    /// Three inliers and one flood-like outlier (last row)
    fn batch() -> Vec<RawRow> {
        vec![row(0.5, 0.5), row(0.6, 0.4), row(0.4, 0.6), row(-1.0, 30.0)]
    }

    #[test]
    fn test_outlier_flagged_end_to_end() {
        let ctx = context();
        let scored = ctx.score_batch(&batch()).unwrap();

        let summary = scored.summary();
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.complete, 4);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.flagged_by_threshold, 1);
        assert_eq!(summary.flagged_by_vote, 1);
        assert_eq!(scored.flagged_rows().collect::<Vec<_>>(), vec![3]);

        let report = &scored.reports()[3];
        assert_eq!(report.severity, Some(Severity::High));
        assert_eq!(report.decision.as_ref().unwrap().votes, 3);

        let alert = scored.alert(3, Utc::now()).unwrap();
        assert!(alert.is_anomaly());
        assert_eq!(alert.source, DEFAULT_SOURCE_TAG);
        assert_eq!(alert.evidence.top_features.features(), &[PORT, BYTES]);
        assert_eq!(alert.hypothesis.label, LABEL_DOS);
        assert_eq!(alert.hypothesis.confidence, Confidence::High);
    }

    /// Population [0.9, 0.5, 0.3, 0.1, -0.2], q = 0.2: linear interpolation
    /// gives 0.04; a row scoring 0.1 is above it and not anomalous.
    #[test]
    fn test_scenario_quantile_threshold() {
        let threshold = BatchThreshold::from_population(&[0.9, 0.5, 0.3, 0.1, -0.2], 0.2).unwrap();
        assert!((threshold.value - 0.04).abs() < 1e-12);
        assert!(!threshold.is_anomaly(0.1));
        assert!(threshold.is_anomaly(-0.2));

        let decision = EnsembleDecision::from_verdicts(0.1, Vec::new());
        let hypothesis = classify(&Evidence::default(), threshold.severity(0.1));
        let alert = assemble(
            AlertParts {
                row: 3,
                source: DEFAULT_SOURCE_TAG,
                decision: &decision,
                threshold: &threshold,
                evidence: Evidence::default(),
                hypothesis: &hypothesis,
                degradations: &[],
                label: None,
            },
            Utc::now(),
        );
        assert!(!alert.is_anomaly());
        assert_eq!(alert.ml.severity, Severity::Low);
    }

    #[test]
    fn test_scenario_flood_evidence_high_severity() {
        let evidence = Evidence::new(vec![BYTES.to_string(), PORT.to_string()]);
        let h = classify(&evidence, Severity::High);
        assert_eq!(h.label, LABEL_DOS);
        assert_eq!(h.confidence, Confidence::High);

        // timing evidence outranks throughput
        let mixed = Evidence::new(vec![BYTES.to_string(), "Flow IAT Mean".to_string()]);
        assert_eq!(classify(&mixed, Severity::High).label, LABEL_RECON);
    }

    /// LOF fitted on three features cannot score two-feature rows: its vote
    /// drops to 0 on every row and the other two still decide.
    #[test]
    fn test_scenario_secondary_degraded() {
        let mut lof = square_lof();
        lof.reference = vec![vec![0.0; 3]; 4];
        let ctx = context_with(lof, TriageConfig::default());

        let scored = ctx.score_batch(&batch()).unwrap();
        let summary = scored.summary();
        assert_eq!(summary.degraded, 4);
        assert_eq!(summary.failed, 0);

        let report = &scored.reports()[3];
        assert_eq!(report.status, RowStatus::Degraded);
        assert_eq!(report.degradations[0].detector, DetectorKind::LocalOutlier);
        assert_eq!(report.degradations[0].code, "feature_count");
        let decision = report.decision.as_ref().unwrap();
        assert_eq!(decision.votes, 2);
        assert!(decision.is_anomaly);

        let alert = scored.alert(3, Utc::now()).unwrap();
        assert_eq!(alert.ml.degradations.len(), 1);
    }

    #[test]
    fn test_alert_is_idempotent() {
        let ctx = context();
        let scored = ctx.score_batch(&batch()).unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();

        let first = scored.alert(3, ts).unwrap();
        let second = scored.alert(3, ts).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_schema_mismatch_aborts_batch() {
        let ctx = context();
        let mut rows = batch();
        rows[1].remove(PORT);
        let err = ctx.score_batch(&rows).unwrap_err();
        match err {
            TriageError::SchemaMismatch { missing, total_missing } => {
                assert_eq!(missing, vec![PORT.to_string()]);
                assert_eq!(total_missing, 1);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_alert_row_errors() {
        let ctx = context();
        let scored = ctx.score_batch(&batch()).unwrap();
        assert!(matches!(
            scored.alert(9, Utc::now()),
            Err(TriageError::RowOutOfRange { row: 9, len: 4 })
        ));
    }

    /// Primary that can never score
    struct DeadForest;

    impl Detector for DeadForest {
        fn kind(&self) -> DetectorKind {
            DetectorKind::IsolationForest
        }
        fn n_features(&self) -> usize {
            2
        }
        fn assess(&self, _row: ArrayView1<'_, f64>) -> Result<Assessment, DetectorError> {
            Err(DetectorError::NonFinite)
        }
    }

    #[test]
    fn test_all_primary_failures_is_empty_population() {
        let schema = schema();
        let scaler = identity_scaler(&schema);
        let ensemble = Ensemble::from_detectors(
            Box::new(DeadForest),
            Box::new(square_lof()),
            Box::new(two_centroids()),
            2,
            ClusterPolicy::BatchMinority,
        );
        let ctx = TriageContext::new(TriageConfig::default(), schema, scaler, ensemble).unwrap();
        let err = ctx.score_batch(&batch()).unwrap_err();
        assert!(matches!(err, TriageError::EmptyPopulation { rows: 4 }));
    }

    /// Primary that refuses rows with an implausible byte rate
    struct PickyForest(IsolationForest);

    impl Detector for PickyForest {
        fn kind(&self) -> DetectorKind {
            DetectorKind::IsolationForest
        }
        fn n_features(&self) -> usize {
            self.0.n_features_in
        }
        fn assess(&self, row: ArrayView1<'_, f64>) -> Result<Assessment, DetectorError> {
            if row[0] > 100.0 {
                return Err(DetectorError::NonFinite);
            }
            self.0.assess(row)
        }
    }

    #[test]
    fn test_primary_failure_spares_other_rows() {
        let schema = schema();
        let scaler = identity_scaler(&schema);
        let ensemble = Ensemble::from_detectors(
            Box::new(PickyForest(stump_forest(2))),
            Box::new(square_lof()),
            Box::new(two_centroids()),
            2,
            ClusterPolicy::BatchMinority,
        );
        let ctx = TriageContext::new(TriageConfig::default(), schema, scaler, ensemble).unwrap();
        let scored = ctx
            .score_batch(&[row(0.5, 0.5), row(500.0, 0.4), row(0.4, 0.6)])
            .unwrap();

        let summary = scored.summary();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.complete, 2);
        // threshold comes from the surviving rows only
        assert_eq!(scored.threshold().population, 2);

        let failed = &scored.reports()[1];
        assert_eq!(failed.status, RowStatus::Failed);
        assert!(failed.decision.is_none());
        assert!(failed.is_anomaly.is_none() && failed.severity.is_none());
        assert_eq!(failed.failure.as_ref().unwrap().code, "non_finite");
        for i in [0, 2] {
            assert_eq!(scored.reports()[i].status, RowStatus::Complete);
            assert!(scored.reports()[i].failure.is_none());
        }

        let err = scored.alert(1, Utc::now()).unwrap_err();
        assert_eq!(err.code(), "row_not_scored");
        assert!(scored.alert(0, Utc::now()).is_ok());
    }

    #[test]
    fn test_context_rejects_malformed_forest() {
        let schema = schema();
        let scaler = identity_scaler(&schema);
        let mut forest = stump_forest(2);
        forest.trees[0].feature[0] = 9;
        let ensemble = Ensemble::new(forest, square_lof(), two_centroids(), ClusterPolicy::BatchMinority);

        let err = TriageContext::new(TriageConfig::default(), schema, scaler, ensemble).unwrap_err();
        assert_eq!(err.code(), "artifact");
    }

    #[test]
    fn test_context_rejects_bad_setup() {
        let schema = schema();
        let scaler = identity_scaler(&schema);

        let wide = Ensemble::new(stump_forest(5), square_lof(), two_centroids(), ClusterPolicy::BatchMinority);
        assert!(TriageContext::new(TriageConfig::default(), schema.clone(), scaler.clone(), wide).is_err());

        let fixed = Ensemble::new(stump_forest(2), square_lof(), two_centroids(), ClusterPolicy::Fixed(7));
        assert!(TriageContext::new(TriageConfig::default(), schema, scaler, fixed).is_err());
    }

    #[test]
    fn test_labels_carried_not_scored() {
        let ctx = context();
        let ingested = parse_rows(
            r#"[
                {"Flow Bytes/s": 0.5, "Destination Port": 0.5, "Label": "BENIGN"},
                {"Flow Bytes/s": 0.6, "Destination Port": "0.4", "Label": "BENIGN"},
                {"Flow Bytes/s": 0.4, "Destination Port": 0.6},
                {"Flow Bytes/s": -1.0, "Destination Port": 30, "Label": "DDoS"}
            ]"#,
        )
        .unwrap();
        let scored = ctx.score_ingested(&ingested).unwrap();
        assert_eq!(scored.reports()[0].label.as_deref(), Some("BENIGN"));
        assert_eq!(scored.reports()[2].label, None);
        assert_eq!(scored.alert(3, Utc::now()).unwrap().label.as_deref(), Some("DDoS"));
    }

    fn write_artifacts(dir: &std::path::Path) {
        let schema = schema();
        let write = |name: &str, value: serde_json::Value| {
            std::fs::write(dir.join(name), serde_json::to_vec_pretty(&value).unwrap()).unwrap();
        };
        write(FEATURE_COLUMNS_FILE, serde_json::json!(schema.names()));
        write(SCALER_FILE, serde_json::to_value(identity_scaler(&schema)).unwrap());
        write(ISOLATION_FOREST_FILE, serde_json::to_value(stump_forest(2)).unwrap());
        write(LOF_FILE, serde_json::to_value(square_lof()).unwrap());
        write(KMEANS_FILE, serde_json::to_value(two_centroids()).unwrap());
    }

    #[test]
    fn test_load_from_artifact_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());

        let manifest = ArtifactManifest::compute(
            dir.path(),
            &[FEATURE_COLUMNS_FILE, SCALER_FILE, ISOLATION_FOREST_FILE, LOF_FILE, KMEANS_FILE],
        )
        .unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).unwrap(),
        )
        .unwrap();

        let config = TriageConfig {
            model_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let ctx = TriageContext::load(config.clone()).unwrap();
        assert_eq!(ctx.schema().len(), 2);
        let scored = ctx.score_batch(&batch()).unwrap();
        assert_eq!(scored.summary().flagged_by_vote, 1);

        // Tampering with an artifact fails the manifest check
        std::fs::write(dir.path().join(KMEANS_FILE), b"{\"centroids\": [[0,0],[1,1]]}").unwrap();
        let err = TriageContext::load(config).unwrap_err();
        assert_eq!(err.code(), "artifact");
    }

    #[test]
    fn test_load_rejects_schema_drift() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        // Same names, swapped order: scaler hash no longer matches
        std::fs::write(
            dir.path().join(FEATURE_COLUMNS_FILE),
            serde_json::to_vec(&[PORT, BYTES]).unwrap(),
        )
        .unwrap();

        let config = TriageConfig {
            model_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let err = TriageContext::load(config).unwrap_err();
        assert_eq!(err.code(), "invalid_config");
    }
}
