//! Feature Vector - Normalized ML input for one row
//!
//! Values follow the schema's column order exactly and are always finite.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use super::layout::FeatureSchema;

/// Normalized feature values for a single row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Layout hash of the schema these values follow
    pub layout_hash: u32,
    /// Values in schema order
    values: Vec<f64>,
}

impl FeatureVector {
    /// Create from values in schema order. Returns `None` if any value is non-finite.
    pub fn new(layout_hash: u32, values: Vec<f64>) -> Option<Self> {
        if values.iter().all(|v| v.is_finite()) {
            Some(Self { layout_hash, values })
        } else {
            None
        }
    }

    pub fn from_view(layout_hash: u32, row: ArrayView1<'_, f64>) -> Option<Self> {
        Self::new(layout_hash, row.to_vec())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Iterate (name, value) pairs in schema order
    pub fn named<'a>(&'a self, schema: &'a FeatureSchema) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}
