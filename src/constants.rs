//! Central Configuration Constants
//!
//! Single source of truth for all triage defaults.
//! Environment overrides are read in `logic::config`.

/// Default alerting quantile (flag the most anomalous 1% of a batch)
pub const DEFAULT_QUANTILE: f64 = 0.01;

/// Default number of top contributing features kept as evidence
pub const DEFAULT_TOP_K: usize = 5;

/// Source tag stamped on every alert
pub const DEFAULT_SOURCE_TAG: &str = "network_flow";

/// Display name of the primary detector
pub const PRIMARY_MODEL_NAME: &str = "Isolation Forest";

/// Column carrying ground-truth labels in evaluation datasets (never scored)
pub const LABEL_COLUMN: &str = "Label";

/// Maximum number of missing column names listed in a schema error
pub const MAX_REPORTED_MISSING: usize = 10;

/// Minimum ensemble votes for a positive decision (2-of-3)
pub const MIN_VOTES: u8 = 2;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Siyaj";

// ============================================
// Artifact file names (relative to the model dir)
// ============================================

pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const ISOLATION_FOREST_FILE: &str = "if_model.json";
pub const LOF_FILE: &str = "lof_model.json";
pub const KMEANS_FILE: &str = "kmeans_model.json";
pub const MANIFEST_FILE: &str = "manifest.json";

// ============================================
// Environment variable names
// ============================================

pub const ENV_QUANTILE: &str = "SIYAJ_QUANTILE";
pub const ENV_TOP_K: &str = "SIYAJ_TOP_K";
pub const ENV_MODEL_DIR: &str = "SIYAJ_MODEL_DIR";
pub const ENV_CLUSTER_POLICY: &str = "SIYAJ_CLUSTER_POLICY";
pub const ENV_SOURCE_TAG: &str = "SIYAJ_SOURCE_TAG";

/// Default model directory: `<local data dir>/siyaj/models`, or `./models`
pub fn default_model_dir() -> std::path::PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("siyaj").join("models"))
        .unwrap_or_else(|| std::path::PathBuf::from("models"))
}
