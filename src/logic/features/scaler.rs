//! Standard Scaler - fitted column-wise scaling transform
//!
//! Parameters come from training; the core only applies them.

use std::path::Path;

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use super::layout::FeatureSchema;
use crate::error::{Result, TriageError};

/// Standardization parameters from training: `(x - mean) / scale`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    /// Layout hash of the schema the scaler was fitted against
    #[serde(default)]
    pub schema_hash: Option<u32>,
}

impl StandardScaler {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| TriageError::artifact(path.display().to_string(), e.to_string()))?;
        serde_json::from_str(&raw)
            .map_err(|e| TriageError::artifact(path.display().to_string(), e.to_string()))
    }

    /// Check dimensions and (if recorded) the layout hash against the schema
    pub fn validate(&self, schema: &FeatureSchema) -> Result<()> {
        if self.mean.len() != schema.len() || self.scale.len() != schema.len() {
            return Err(TriageError::InvalidConfig(format!(
                "scaler has {} means / {} scales, schema has {} columns",
                self.mean.len(),
                self.scale.len(),
                schema.len()
            )));
        }
        if self.mean.iter().chain(self.scale.iter()).any(|v| !v.is_finite()) {
            return Err(TriageError::InvalidConfig(
                "scaler parameters must be finite".to_string(),
            ));
        }
        if let Some(hash) = self.schema_hash {
            schema
                .validate_hash(hash)
                .map_err(|e| TriageError::InvalidConfig(e.to_string()))?;
        }
        Ok(())
    }

    /// Effective divisor for a column (zero variance → 1.0)
    fn divisor(&self, col: usize) -> f64 {
        match self.scale.get(col).copied() {
            Some(s) if s != 0.0 => s,
            _ => 1.0,
        }
    }

    /// Scale every column of a (rows × features) matrix in place
    pub fn transform_in_place(&self, matrix: &mut Array2<f64>) {
        for (col, mut column) in matrix.axis_iter_mut(Axis(1)).enumerate() {
            let mean = self.mean.get(col).copied().unwrap_or(0.0);
            let divisor = self.divisor(col);
            column.mapv_inplace(|v| (v - mean) / divisor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_transform_in_place() {
        let scaler = StandardScaler {
            mean: vec![1.0, 10.0],
            scale: vec![2.0, 0.0],
            schema_hash: None,
        };
        let mut m = array![[3.0, 12.0], [1.0, 10.0]];
        scaler.transform_in_place(&mut m);
        assert_eq!(m, array![[1.0, 2.0], [0.0, 0.0]]);
    }

    #[test]
    fn test_validate_dimensions_and_hash() {
        let schema = FeatureSchema::new(vec!["a".to_string(), "b".to_string()]).unwrap();
        let ok = StandardScaler {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
            schema_hash: Some(schema.layout_hash()),
        };
        assert!(ok.validate(&schema).is_ok());

        let short = StandardScaler {
            mean: vec![0.0],
            scale: vec![1.0],
            schema_hash: None,
        };
        assert!(short.validate(&schema).is_err());

        let drifted = StandardScaler {
            schema_hash: Some(schema.layout_hash() ^ 0xdead_beef),
            ..ok
        };
        assert!(drifted.validate(&schema).is_err());
    }
}
