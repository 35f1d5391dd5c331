//! Triage configuration
//!
//! Defaults come from `constants`; environment variables override them.
//! Unparseable values fall back to the default with a warning.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, TriageError};
use crate::logic::model::ClusterPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Lower-tail quantile for the batch threshold, in (0, 1)
    pub quantile: f64,

    /// Evidence length
    pub top_k: usize,

    /// Directory holding the JSON artifacts
    pub model_dir: PathBuf,

    pub cluster_policy: ClusterPolicy,

    /// `source` field of every alert
    pub source_tag: String,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            quantile: DEFAULT_QUANTILE,
            top_k: DEFAULT_TOP_K,
            model_dir: default_model_dir(),
            cluster_policy: ClusterPolicy::default(),
            source_tag: DEFAULT_SOURCE_TAG.to_string(),
        }
    }
}

fn env_parsed<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparseable {}={:?}", name, raw);
            None
        }
    }
}

impl TriageConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            quantile: env_parsed(ENV_QUANTILE).unwrap_or(defaults.quantile),

            top_k: env_parsed(ENV_TOP_K).unwrap_or(defaults.top_k),

            model_dir: env::var(ENV_MODEL_DIR)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),

            cluster_policy: env_parsed(ENV_CLUSTER_POLICY).unwrap_or(defaults.cluster_policy),

            source_tag: env::var(ENV_SOURCE_TAG)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.source_tag),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.quantile > 0.0 && self.quantile < 1.0) {
            return Err(TriageError::InvalidConfig(format!(
                "quantile must be in (0, 1), got {}",
                self.quantile
            )));
        }
        if self.top_k == 0 {
            return Err(TriageError::InvalidConfig(
                "top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
