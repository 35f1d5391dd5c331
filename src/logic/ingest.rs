//! Row ingest
//!
//! Reads flow rows from a JSON array of objects or from JSON Lines. Cells
//! become `Option<f64>`: numbers and numeric strings (including `inf` and
//! `NaN`) parse, everything else is missing. The `Label` column is split
//! off and never reaches the normalizer.

use std::path::Path;

use serde_json::{Map, Value};

use crate::constants::LABEL_COLUMN;
use crate::error::{Result, TriageError};
use crate::logic::features::RawRow;

/// Parsed input batch
#[derive(Debug, Clone, Default)]
pub struct IngestedBatch {
    pub rows: Vec<RawRow>,
    /// `Label` value per row, if present
    pub labels: Vec<Option<String>>,
}

impl IngestedBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Numeric cell value; anything non-numeric is missing
pub fn parse_cell(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            match s.to_lowercase().as_str() {
                "inf" | "+inf" | "infinity" | "+infinity" => Some(f64::INFINITY),
                "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
                "nan" => Some(f64::NAN),
                _ => s.parse().ok(),
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Split one JSON object into a raw row and its label
pub fn row_from_object(object: &Map<String, Value>) -> (RawRow, Option<String>) {
    let mut row = RawRow::with_capacity(object.len());
    let mut label = None;
    for (key, value) in object {
        // CIC-style exports pad column names with spaces
        let name = key.trim();
        if name == LABEL_COLUMN {
            label = label_text(value);
            continue;
        }
        row.insert(name.to_string(), parse_cell(value));
    }
    (row, label)
}

fn push_value(batch: &mut IngestedBatch, value: &Value, position: usize) -> Result<()> {
    match value {
        Value::Object(object) => {
            let (row, label) = row_from_object(object);
            batch.rows.push(row);
            batch.labels.push(label);
            Ok(())
        }
        _ => Err(TriageError::InvalidConfig(format!(
            "input row {} is not a JSON object",
            position
        ))),
    }
}

/// Parse a JSON array of objects, or JSON Lines when the text does not
/// start with `[`
pub fn parse_rows(text: &str) -> Result<IngestedBatch> {
    let mut batch = IngestedBatch::default();

    if text.trim_start().starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(text)?;
        for (i, value) in values.iter().enumerate() {
            push_value(&mut batch, value, i)?;
        }
    } else {
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line)?;
            push_value(&mut batch, &value, i)?;
        }
    }

    log::info!("Ingested {} rows", batch.len());
    Ok(batch)
}

pub fn read_rows(path: &Path) -> Result<IngestedBatch> {
    let text = std::fs::read_to_string(path)?;
    parse_rows(&text)
}
