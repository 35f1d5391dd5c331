//! Features Module - Feature Normalization
//!
//! Turns raw flow rows into schema-ordered, scaled feature vectors.
//!
//! - `layout`: the fixed feature schema and its layout hash
//! - `scaler`: the fitted standard scaler
//! - `normalize`: alignment, batch-median imputation, scaling
//! - `vector`: one normalized row

pub mod layout;
pub mod normalize;
pub mod scaler;
pub mod vector;


// Re-export common types
pub use layout::{FeatureSchema, LayoutInfo, FEATURE_VERSION};
pub use normalize::{normalize_batch, NormalizedBatch, RawRow};
pub use scaler::StandardScaler;
pub use vector::FeatureVector;
