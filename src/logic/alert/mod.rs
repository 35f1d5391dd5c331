//! Alert Module - immutable per-row alert records

pub mod assembler;
pub mod types;

pub use assembler::{assemble, AlertParts};
pub use types::{Alert, AlertDecision, EnsembleBlock, EvidenceBlock, HypothesisBlock, MlBlock};
