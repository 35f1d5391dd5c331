//! Threat Module
//!
//! Turns evidence into an attack-category hypothesis. Two independent
//! heuristics are kept side by side and labeled with their strategy.
//!
//! ## Structure
//! - `types`: Evidence, Hypothesis, Confidence (+ JSON normalization)
//! - `rules`: indicator sets, labels, breakpoints
//! - `classifier`: first-match rule table
//! - `scored`: evidence + margin points

pub mod classifier;
pub mod rules;
pub mod scored;
pub mod types;

pub use classifier::classify;
pub use types::{Confidence, Evidence, Hypothesis, HypothesisStrategy};
