//! Feature Normalizer
//!
//! Aligns raw rows to the schema, repairs invalid values and applies the
//! fitted scaler.
//!
//! ## Batch-relative imputation
//! Missing and infinite values are imputed with the median of that column
//! over the *current batch*, not a training-time median. The same row can
//! therefore normalize differently in two different batches.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};

use super::layout::FeatureSchema;
use super::scaler::StandardScaler;
use super::vector::FeatureVector;
use crate::constants::MAX_REPORTED_MISSING;
use crate::error::{Result, TriageError};

/// One input row: column name → value (`None` = missing)
pub type RawRow = HashMap<String, Option<f64>>;

/// Scaled, schema-ordered batch matrix (rows × features)
#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    matrix: Array2<f64>,
    layout_hash: u32,
    /// Cells that were missing or non-finite and got imputed
    pub imputed_cells: usize,
    /// Columns with no finite value in the batch (fell back to the training mean)
    pub empty_columns: Vec<String>,
}

impl NormalizedBatch {
    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn features(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.matrix.nrows()).then(|| self.matrix.row(index))
    }

    pub fn vector(&self, index: usize) -> Option<FeatureVector> {
        self.row(index)
            .and_then(|row| FeatureVector::from_view(self.layout_hash, row))
    }
}

/// Collect schema columns absent from at least one row, in schema order
pub fn missing_columns(rows: &[RawRow], schema: &FeatureSchema) -> Vec<String> {
    schema
        .names()
        .iter()
        .filter(|name| rows.iter().any(|row| !row.contains_key(name.as_str())))
        .cloned()
        .collect()
}

/// Median of the finite values, `None` if there are none
pub fn finite_median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut finite: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(f64::total_cmp);

    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        Some((finite[mid - 1] + finite[mid]) / 2.0)
    } else {
        Some(finite[mid])
    }
}

/// Normalize a batch of rows.
///
/// Fails with `SchemaMismatch` if any schema column is absent; the error
/// lists up to the first 10 missing names plus the total count.
pub fn normalize_batch(
    rows: &[RawRow],
    schema: &FeatureSchema,
    scaler: &StandardScaler,
) -> Result<NormalizedBatch> {
    if rows.is_empty() {
        return Err(TriageError::EmptyBatch);
    }

    let missing = missing_columns(rows, schema);
    if !missing.is_empty() {
        let total_missing = missing.len();
        return Err(TriageError::SchemaMismatch {
            missing: missing.into_iter().take(MAX_REPORTED_MISSING).collect(),
            total_missing,
        });
    }

    // Align to schema order; missing / ±inf / NaN all become NaN here
    let mut matrix = Array2::<f64>::from_elem((rows.len(), schema.len()), f64::NAN);
    for (r, row) in rows.iter().enumerate() {
        for (c, name) in schema.names().iter().enumerate() {
            if let Some(Some(value)) = row.get(name) {
                if value.is_finite() {
                    matrix[[r, c]] = *value;
                }
            }
        }
    }

    let mut imputed_cells = 0;
    let mut empty_columns = Vec::new();

    for (c, name) in schema.names().iter().enumerate() {
        let mut column = matrix.column_mut(c);
        let gaps = column.iter().filter(|v| !v.is_finite()).count();
        if gaps == 0 {
            continue;
        }

        let fill = match finite_median(column.iter().copied()) {
            Some(median) => median,
            None => {
                log::warn!("Column '{}' has no finite values in this batch; using training mean", name);
                empty_columns.push(name.clone());
                scaler.mean.get(c).copied().unwrap_or(0.0)
            }
        };

        column.mapv_inplace(|v| if v.is_finite() { v } else { fill });
        imputed_cells += gaps;
    }

    scaler.transform_in_place(&mut matrix);

    if imputed_cells > 0 {
        log::debug!("Imputed {} cells with batch medians", imputed_cells);
    }

    Ok(NormalizedBatch {
        matrix,
        layout_hash: schema.layout_hash(),
        imputed_cells,
        empty_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec!["a".to_string(), "b".to_string()]).unwrap()
    }

    fn identity() -> StandardScaler {
        StandardScaler {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
            schema_hash: None,
        }
    }

    fn row(pairs: &[(&str, Option<f64>)]) -> RawRow {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_median() {
        assert_eq!(finite_median([3.0, 1.0, 2.0].into_iter()), Some(2.0));
        assert_eq!(finite_median([4.0, 1.0, 2.0, 3.0].into_iter()), Some(2.5));
        assert_eq!(finite_median([f64::NAN, f64::INFINITY].into_iter()), None);
    }

    #[test]
    fn test_schema_mismatch_reports_all_missing() {
        let rows = vec![row(&[("a", Some(1.0))])];
        let err = normalize_batch(&rows, &schema(), &identity()).unwrap_err();
        match err {
            TriageError::SchemaMismatch { missing, total_missing } => {
                assert_eq!(missing, vec!["b".to_string()]);
                assert_eq!(total_missing, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_list_is_capped() {
        let names: Vec<String> = (0..15).map(|i| format!("f{i}")).collect();
        let schema = FeatureSchema::new(names).unwrap();
        let scaler = StandardScaler {
            mean: vec![0.0; 15],
            scale: vec![1.0; 15],
            schema_hash: None,
        };
        let rows = vec![row(&[("f0", Some(1.0))])];
        match normalize_batch(&rows, &schema, &scaler).unwrap_err() {
            TriageError::SchemaMismatch { missing, total_missing } => {
                assert_eq!(missing.len(), MAX_REPORTED_MISSING);
                assert_eq!(missing[0], "f1");
                assert_eq!(total_missing, 14);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_infinity_and_missing_use_batch_median() {
        let rows = vec![
            row(&[("a", Some(1.0)), ("b", Some(10.0))]),
            row(&[("a", Some(f64::INFINITY)), ("b", None)]),
            row(&[("a", Some(3.0)), ("b", Some(30.0))]),
        ];
        let batch = normalize_batch(&rows, &schema(), &identity()).unwrap();
        assert_eq!(batch.imputed_cells, 2);
        assert_eq!(batch.matrix()[[1, 0]], 2.0);
        assert_eq!(batch.matrix()[[1, 1]], 20.0);
    }

    #[test]
    fn test_imputation_is_batch_dependent() {
        let target = row(&[("a", None), ("b", Some(0.0))]);
        let batch_one = vec![target.clone(), row(&[("a", Some(1.0)), ("b", Some(0.0))])];
        let batch_two = vec![target, row(&[("a", Some(9.0)), ("b", Some(0.0))])];

        let one = normalize_batch(&batch_one, &schema(), &identity()).unwrap();
        let two = normalize_batch(&batch_two, &schema(), &identity()).unwrap();
        assert_ne!(one.matrix()[[0, 0]], two.matrix()[[0, 0]]);
    }

    #[test]
    fn test_all_missing_column_falls_back_to_mean() {
        let scaler = StandardScaler {
            mean: vec![5.0, 0.0],
            scale: vec![2.0, 1.0],
            schema_hash: None,
        };
        let rows = vec![row(&[("a", None), ("b", Some(1.0))])];
        let batch = normalize_batch(&rows, &schema(), &scaler).unwrap();
        assert_eq!(batch.empty_columns, vec!["a".to_string()]);
        assert_eq!(batch.matrix()[[0, 0]], 0.0);
        assert!(batch.vector(0).is_some());
    }

    #[test]
    fn test_output_preserves_schema_order_and_ignores_extras() {
        let rows = vec![row(&[("b", Some(2.0)), ("Label", Some(1.0)), ("a", Some(1.0)), ("extra", Some(9.0))])];
        let batch = normalize_batch(&rows, &schema(), &identity()).unwrap();
        assert_eq!(batch.features(), 2);
        assert_eq!(batch.row(0).unwrap().to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_empty_batch() {
        assert!(matches!(
            normalize_batch(&[], &schema(), &identity()),
            Err(TriageError::EmptyBatch)
        ));
    }
}
