//! Quantile Threshold & Severity
//!
//! The alert threshold is the lower-tail q-quantile of the primary scores in
//! the current batch. It is recomputed per batch and has no meaning outside
//! the batch that produced it.
//!
//! ## Non-invariant
//! Severity depends on the batch threshold, so the same score can band
//! differently in batches with a different `q` or a different population.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Multiplier below which a score is banded High
pub const HIGH_SEVERITY_FACTOR: f64 = 0.8;

// ============================================================================
// SEVERITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// High iff score < threshold × 0.8, Medium iff score < threshold, else Low.
    /// Pure function of (score, threshold).
    pub fn classify(score: f64, threshold: f64) -> Self {
        if score < threshold * HIGH_SEVERITY_FACTOR {
            Severity::High
        } else if score < threshold {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }

    /// Lenient parse used at the JSON normalization boundary
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// QUANTILE
// ============================================================================

/// q-quantile with linear interpolation between order statistics
/// (position `q * (n - 1)` in the sorted population).
pub fn quantile(population: &[f64], q: f64) -> Result<f64> {
    if !(q > 0.0 && q < 1.0) {
        return Err(TriageError::InvalidConfig(format!(
            "quantile must be in (0, 1), got {}",
            q
        )));
    }
    if population.is_empty() {
        return Err(TriageError::EmptyPopulation { rows: 0 });
    }
    if population.iter().any(|s| !s.is_finite()) {
        return Err(TriageError::InvalidConfig(
            "score population contains non-finite values".to_string(),
        ));
    }

    let mut sorted = population.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

// ============================================================================
// BATCH THRESHOLD
// ============================================================================

/// Threshold derived from one batch's score population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchThreshold {
    pub value: f64,
    pub quantile: f64,
    pub population: usize,
}

impl BatchThreshold {
    /// A population of one yields that score, which then flags itself.
    pub fn from_population(scores: &[f64], q: f64) -> Result<Self> {
        let value = quantile(scores, q)?;
        if scores.len() == 1 {
            log::warn!("Threshold computed from a single-row batch; the row is trivially anomalous");
        }
        Ok(Self {
            value,
            quantile: q,
            population: scores.len(),
        })
    }

    /// Lower scores are more anomalous: flagged iff score ≤ threshold
    pub fn is_anomaly(&self, score: f64) -> bool {
        score <= self.value
    }

    pub fn severity(&self, score: f64) -> Severity {
        Severity::classify(score, self.value)
    }
}

/// Summary statistics of a score population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sample_count: usize,
}

impl ThresholdStats {
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        Some(Self {
            min,
            max,
            mean,
            sample_count: scores.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_severity_bands() {
        let threshold = 1.0;
        assert_eq!(Severity::classify(threshold * 0.79, threshold), Severity::High);
        assert_eq!(Severity::classify(threshold * 0.9, threshold), Severity::Medium);
        assert_eq!(Severity::classify(threshold * 1.5, threshold), Severity::Low);
        assert_eq!(Severity::classify(threshold, threshold), Severity::Low);
    }

    #[test]
    fn test_quantile_interpolates() {
        let scores = [0.9, 0.5, 0.3, 0.1, -0.2];
        let t = quantile(&scores, 0.2).unwrap();
        assert!((t - 0.04).abs() < 1e-12, "got {t}");
        assert!((quantile(&scores, 0.5).unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_single_score_population() {
        let t = BatchThreshold::from_population(&[0.42], 0.01).unwrap();
        assert_eq!(t.value, 0.42);
        assert!(t.is_anomaly(0.42));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(quantile(&[1.0], 0.0).is_err());
        assert!(quantile(&[1.0], 1.0).is_err());
        assert!(quantile(&[], 0.5).is_err());
        assert!(quantile(&[f64::NAN], 0.5).is_err());
    }

    #[test]
    fn test_stats() {
        let stats = ThresholdStats::from_scores(&[1.0, -1.0, 3.0]).unwrap();
        assert_eq!(stats.min, -1.0);
        assert_eq!(stats.max, 3.0);
        assert!((stats.mean - 1.0).abs() < 1e-12);
        assert!(ThresholdStats::from_scores(&[]).is_none());
    }

    proptest! {
        #[test]
        fn prop_quantile_monotone_in_q(
            scores in proptest::collection::vec(-1.0f64..1.0, 1..64),
            a in 0.001f64..0.999,
            b in 0.001f64..0.999,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let t_lo = quantile(&scores, lo).unwrap();
            let t_hi = quantile(&scores, hi).unwrap();
            prop_assert!(t_lo <= t_hi + 1e-12);
        }

        #[test]
        fn prop_lower_score_never_less_severe(
            a in -2.0f64..2.0,
            b in -2.0f64..2.0,
            threshold in 0.001f64..2.0,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(Severity::classify(low, threshold) >= Severity::classify(high, threshold));
        }
    }
}
