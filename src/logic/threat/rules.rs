//! Hypothesis Rules & Constants
//!
//! Indicator sets, labels and margin breakpoints. No logic here.

// ============================================================================
// RULE-TABLE VARIANT
// ============================================================================

pub const LABEL_RECON: &str = "Reconnaissance/Scanning";
pub const LABEL_DOS: &str = "DoS-like Behavior";
pub const LABEL_UNKNOWN: &str = "Unknown/Unclassified";

/// Timing / inter-arrival features (rule 1)
pub const TIMING_FEATURES: &[&str] = &[
    "Flow IAT Mean",
    "Flow IAT Std",
    "Flow IAT Max",
    "Flow IAT Min",
];

/// Throughput features (rule 2)
pub const THROUGHPUT_FEATURES: &[&str] = &[
    "Flow Bytes/s",
    "Flow Packets/s",
    "Fwd Packets/s",
    "Bwd Packets/s",
];

// ============================================================================
// SCORED VARIANT
// ============================================================================

pub const LABEL_FLOODING: &str = "Possible DoS / Traffic Flooding";
pub const LABEL_PORT_SCAN: &str = "Possible Scanning / Port-related anomaly";
pub const LABEL_TIMING: &str = "Anomalous Timing Pattern (IAT-related)";
pub const LABEL_GENERIC: &str = "Anomalous Activity";

/// Case-insensitive substrings marking an indicator family
pub const BYTES_KEYWORD: &str = "bytes";
pub const PACKETS_KEYWORD: &str = "packets";
pub const PORT_KEYWORD: &str = "port";
pub const IAT_KEYWORD: &str = "iat";

/// threshold - score above this earns 2 margin points
pub const WIDE_MARGIN: f64 = 0.02;
/// threshold - score above this earns 1 margin point
pub const NARROW_MARGIN: f64 = 0.005;

/// Total points for High / Medium confidence
pub const HIGH_CONFIDENCE_POINTS: u8 = 4;
pub const MEDIUM_CONFIDENCE_POINTS: u8 = 2;
