use super::types::FeatureContribution;
use crate::logic::features::{FeatureSchema, FeatureVector};
use crate::logic::threat::Evidence;

/// The `k` features with the largest absolute normalized value, descending.
///
/// The sort is stable, so equal magnitudes keep schema order. A vector built
/// against a different layout yields nothing.
pub fn top_features(vector: &FeatureVector, schema: &FeatureSchema, k: usize) -> Vec<FeatureContribution> {
    if vector.layout_hash != schema.layout_hash() {
        log::warn!(
            "Feature vector layout {:08x} does not match schema {:08x}; no evidence extracted",
            vector.layout_hash,
            schema.layout_hash()
        );
        return Vec::new();
    }

    let mut contributions: Vec<FeatureContribution> = vector
        .named(schema)
        .map(|(name, value)| FeatureContribution {
            name: name.to_string(),
            value,
            magnitude: value.abs(),
        })
        .collect();

    // Sort by magnitude DESC
    contributions.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
    contributions.truncate(k);
    contributions
}

/// Names only, in rank order
pub fn extract_evidence(vector: &FeatureVector, schema: &FeatureSchema, k: usize) -> Evidence {
    Evidence::new(
        top_features(vector, schema, k)
            .into_iter()
            .map(|c| c.name)
            .collect(),
    )
}
