//! Feature Layout - Feature Schema Definition
//!
//! **CRITICAL: the schema is fixed at training time**
//!
//! ## Rules (NEVER break these):
//! 1. Column order is the order the scaler and detectors were fitted on
//! 2. Add / remove / reorder a column → retrain and re-export every artifact
//! 3. The layout hash changes with any of the above
//!
//! The schema is loaded from `feature_columns.json` instead of being compiled
//! in, so one binary can serve several model sets. The hash lets artifacts
//! record which layout they were fitted against.

use std::collections::HashMap;
use std::path::Path;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::constants::LABEL_COLUMN;
use crate::error::{Result, TriageError};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout format version
/// MUST be incremented when the hashing scheme changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

/// Ordered, immutable list of feature slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
    hash: u32,
}

impl FeatureSchema {
    /// Build a schema from ordered column names.
    ///
    /// Rejects empty schemas, duplicate names and the label column.
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(TriageError::InvalidConfig(
                "feature schema has no columns".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name == LABEL_COLUMN {
                return Err(TriageError::InvalidConfig(format!(
                    "feature schema must not contain the '{}' column",
                    LABEL_COLUMN
                )));
            }
            if index.insert(name.clone(), i).is_some() {
                return Err(TriageError::InvalidConfig(format!(
                    "duplicate feature column '{}'",
                    name
                )));
            }
        }

        let hash = compute_layout_hash(&names);
        Ok(Self { names, index, hash })
    }

    /// Load from a JSON array of column names
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| TriageError::artifact(path.display().to_string(), e.to_string()))?;
        let names: Vec<String> = serde_json::from_str(&raw)
            .map_err(|e| TriageError::artifact(path.display().to_string(), e.to_string()))?;
        Self::new(names)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// CRC32 of version + ordered names
    pub fn layout_hash(&self) -> u32 {
        self.hash
    }

    /// Get feature index by name
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Get feature name by index
    pub fn feature_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            version: FEATURE_VERSION,
            hash: self.hash,
            feature_count: self.names.len(),
            feature_names: self.names.clone(),
        }
    }

    /// Validate that an artifact was fitted against this layout
    pub fn validate_hash(&self, artifact_hash: u32) -> std::result::Result<(), LayoutMismatchError> {
        if artifact_hash != self.hash {
            return Err(LayoutMismatchError {
                expected_hash: self.hash,
                actual_hash: artifact_hash,
            });
        }
        Ok(())
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of a feature layout
fn compute_layout_hash(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

/// Artifact fitted against a different layout
#[derive(Debug, Clone)]
pub struct LayoutMismatchError {
    pub expected_hash: u32,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected hash {:08x}, artifact has {:08x}",
            self.expected_hash, self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_schema_index_lookup() {
        let schema = FeatureSchema::new(names(&["Destination Port", "Flow Duration", "Flow Bytes/s"])).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.feature_index("Flow Duration"), Some(1));
        assert_eq!(schema.feature_index("nonexistent"), None);
        assert_eq!(schema.feature_name(2), Some("Flow Bytes/s"));
        assert_eq!(schema.feature_name(3), None);
    }

    #[test]
    fn test_layout_hash_is_order_sensitive() {
        let a = FeatureSchema::new(names(&["a", "b"])).unwrap();
        let b = FeatureSchema::new(names(&["b", "a"])).unwrap();
        let a2 = FeatureSchema::new(names(&["a", "b"])).unwrap();
        assert_ne!(a.layout_hash(), b.layout_hash());
        assert_eq!(a.layout_hash(), a2.layout_hash());
        assert_ne!(a.layout_hash(), 0);
    }

    #[test]
    fn test_rejects_duplicates_and_label() {
        assert!(FeatureSchema::new(names(&["a", "a"])).is_err());
        assert!(FeatureSchema::new(names(&["a", "Label"])).is_err());
        assert!(FeatureSchema::new(Vec::new()).is_err());
    }

    #[test]
    fn test_validate_hash() {
        let schema = FeatureSchema::new(names(&["a", "b"])).unwrap();
        assert!(schema.validate_hash(schema.layout_hash()).is_ok());
        assert!(schema.validate_hash(schema.layout_hash().wrapping_add(1)).is_err());
    }

    #[test]
    fn test_layout_info() {
        let schema = FeatureSchema::new(names(&["a", "b", "c"])).unwrap();
        let info = schema.info();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_count, 3);
        assert_eq!(info.feature_names, names(&["a", "b", "c"]));
    }
}
