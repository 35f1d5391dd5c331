//! Threat Types
//!
//! Evidence in, Hypothesis out. Data structures and the JSON normalization
//! boundary only; rule logic lives in `classifier` and `scored`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rules::LABEL_UNKNOWN;

// ============================================================================
// CONFIDENCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        }
    }

    /// Unknown strings map to Low
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" | "med" => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// EVIDENCE
// ============================================================================

/// Top contributing feature names, most influential first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Evidence(Vec<String>);

impl Evidence {
    pub fn new(features: Vec<String>) -> Self {
        Self(features)
    }

    /// Non-array input normalizes to empty evidence; non-string items are dropped
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => Self::default(),
        }
    }

    pub fn features(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Evidence entries that appear in `set`, in evidence order
    pub fn intersect<'a>(&'a self, set: &'a [&str]) -> Vec<&'a str> {
        self.iter().filter(|f| set.iter().any(|s| s == f)).collect()
    }
}

// ============================================================================
// HYPOTHESIS
// ============================================================================

/// Which heuristic produced a hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisStrategy {
    /// First-match rule table on evidence + severity
    RuleTable,
    /// Evidence points + score/threshold margin points
    Scored,
    /// Normalized from an external collaborator's output
    External,
}

/// Attack-category guess; not ground truth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub label: String,
    pub confidence: Confidence,
    pub reasons: Vec<String>,
    pub strategy: HypothesisStrategy,
}

impl Hypothesis {
    pub fn unknown(strategy: HypothesisStrategy, reason: impl Into<String>) -> Self {
        Self {
            label: LABEL_UNKNOWN.to_string(),
            confidence: Confidence::Low,
            reasons: vec![reason.into()],
            strategy,
        }
    }

    /// All reasons joined into one sentence block
    pub fn reason(&self) -> String {
        self.reasons.join(" ")
    }

    /// Single entry point for hypotheses of unknown shape.
    ///
    /// - object: `label`/`type`, `confidence`, `reasons` | `reason` | `why`
    /// - array: `[label, confidence?, why?]`
    /// - string: bare label with Low confidence
    /// - anything else: Unknown/Unclassified, Low
    pub fn normalize(value: &Value) -> Self {
        let strategy = HypothesisStrategy::External;
        match value {
            Value::Object(map) => {
                let label = ["label", "type"]
                    .iter()
                    .find_map(|k| map.get(*k).and_then(Value::as_str))
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(LABEL_UNKNOWN)
                    .to_string();
                let confidence = map
                    .get("confidence")
                    .and_then(Value::as_str)
                    .map(Confidence::parse_lenient)
                    .unwrap_or(Confidence::Low);
                let reasons = match map.get("reasons") {
                    Some(Value::Array(items)) => items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                    _ => ["reason", "why"]
                        .iter()
                        .filter_map(|k| map.get(*k).and_then(Value::as_str))
                        .map(str::to_string)
                        .take(1)
                        .collect(),
                };
                Self {
                    label,
                    confidence,
                    reasons,
                    strategy,
                }
            }
            Value::Array(items) => {
                let Some(label) = items.first().and_then(Value::as_str) else {
                    return Self::unknown(strategy, "Unrecognized hypothesis shape");
                };
                let confidence = items
                    .get(1)
                    .and_then(Value::as_str)
                    .map(Confidence::parse_lenient)
                    .unwrap_or(Confidence::Low);
                let reasons = items
                    .get(2)
                    .and_then(Value::as_str)
                    .map(|s| vec![s.to_string()])
                    .unwrap_or_default();
                Self {
                    label: label.to_string(),
                    confidence,
                    reasons,
                    strategy,
                }
            }
            Value::String(label) if !label.trim().is_empty() => Self {
                label: label.trim().to_string(),
                confidence: Confidence::Low,
                reasons: Vec::new(),
                strategy,
            },
            _ => Self::unknown(strategy, "Unrecognized hypothesis shape"),
        }
    }
}
