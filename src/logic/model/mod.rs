//! Model Module - detectors, vote fusion, batch threshold
//!
//! Detectors are loaded once from JSON artifacts and are read-only
//! afterwards, so a single `Ensemble` can score batches from many threads.

pub mod artifacts;
pub mod detector;
pub mod ensemble;
pub mod isolation_forest;
pub mod kmeans;
pub mod lof;
pub mod threshold;

// Re-export common types
pub use artifacts::{load_json, ArtifactManifest};
pub use detector::{Assessment, Detector, DetectorKind};
pub use ensemble::{majority_vote, DetectorVerdict, Ensemble, EnsembleDecision, RowScore, RowStatus};
pub use isolation_forest::IsolationForest;
pub use kmeans::{ClusterPolicy, KMeans};
pub use lof::LocalOutlierFactor;
pub use threshold::{quantile, BatchThreshold, Severity, ThresholdStats};
