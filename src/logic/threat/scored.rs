//! Scored Hypothesis
//!
//! Alternative heuristic used by the explanation surface. Confidence is
//! evidence points (0-3) plus margin points (0-2). It can disagree with the
//! rule table; neither is authoritative.

use super::rules::*;
use super::types::{Confidence, Evidence, Hypothesis, HypothesisStrategy};

/// Indicator families present in the evidence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indicators {
    pub bytes: bool,
    pub packets: bool,
    pub port: bool,
    pub iat: bool,
}

impl Indicators {
    pub fn detect(evidence: &Evidence) -> Self {
        let mut found = Self::default();
        for feature in evidence.iter() {
            let f = feature.to_lowercase();
            found.bytes |= f.contains(BYTES_KEYWORD);
            found.packets |= f.contains(PACKETS_KEYWORD);
            found.port |= f.contains(PORT_KEYWORD);
            found.iat |= f.contains(IAT_KEYWORD);
        }
        found
    }

    fn traffic(&self) -> bool {
        self.bytes || self.packets
    }

    /// One point per family: traffic, port, timing
    pub fn points(&self) -> u8 {
        self.traffic() as u8 + self.port as u8 + self.iat as u8
    }
}

/// 2 if threshold - score > 0.02, 1 if > 0.005, else 0
pub fn margin_points(score: f64, threshold: f64) -> u8 {
    let gap = threshold - score;
    if gap > WIDE_MARGIN {
        2
    } else if gap > NARROW_MARGIN {
        1
    } else {
        0
    }
}

pub fn confidence_for(points: u8) -> Confidence {
    if points >= HIGH_CONFIDENCE_POINTS {
        Confidence::High
    } else if points >= MEDIUM_CONFIDENCE_POINTS {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Label by first match, then confidence from points.
/// Without both score and threshold no margin points are awarded.
pub fn assess(evidence: &Evidence, score: Option<f64>, threshold: Option<f64>) -> Hypothesis {
    let ind = Indicators::detect(evidence);

    let (label, mut reasons) = if ind.traffic() && ind.port {
        (
            LABEL_FLOODING,
            vec![
                "Traffic intensity indicators present (Bytes/s or Packets/s).".to_string(),
                "Port-related indicator present (Destination Port), suggesting a targeted service."
                    .to_string(),
            ],
        )
    } else if ind.port {
        (
            LABEL_PORT_SCAN,
            vec!["Port-related indicator present (Destination Port), possibly probing or scanning.".to_string()],
        )
    } else if ind.iat {
        (
            LABEL_TIMING,
            vec!["Most influential features relate to packet inter-arrival time (IAT), suggesting an abnormal or throttled pattern.".to_string()],
        )
    } else {
        (
            LABEL_GENERIC,
            vec!["Influential features do not point to a specific category, but behavior is outside the baseline.".to_string()],
        )
    };

    let mut margin = 0;
    if let (Some(score), Some(threshold)) = (score, threshold) {
        margin = margin_points(score, threshold);
        let gap = threshold - score;
        let size = match margin {
            2 => "Clear",
            1 => "Moderate",
            _ => "Small",
        };
        reasons.push(format!(
            "{} gap between score and threshold (threshold - score = {:.4}).",
            size, gap
        ));
    }

    Hypothesis {
        label: label.to_string(),
        confidence: confidence_for(ind.points() + margin),
        reasons,
        strategy: HypothesisStrategy::Scored,
    }
}
