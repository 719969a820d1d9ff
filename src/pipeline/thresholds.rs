//! Classification thresholds shared by every consumer.
//!
//! Each value lives here and nowhere else: chart markers, table rows, and
//! summary counts all classify through these constants, so two views can
//! never disagree about the same point.

/// Drift below this magnitude (percent change between window halves) is
/// reported as stable.
pub const DRIFT_THRESHOLD_PCT: f64 = 5.0;

/// Anomaly severity breakpoints, as percent deviation from the expected
/// baseline. A point is an anomaly iff its deviation magnitude exceeds the
/// lowest breakpoint.
pub const ANOMALY_LOW_PCT: f64 = 10.0;
pub const ANOMALY_MEDIUM_PCT: f64 = 25.0;
pub const ANOMALY_HIGH_PCT: f64 = 50.0;
pub const ANOMALY_CRITICAL_PCT: f64 = 100.0;

/// Distribution panels show this many ranked entities before collapsing the
/// remainder into a single bucket.
pub const DISTRIBUTION_TOP_N: usize = 10;

/// Label of the synthesized remainder bucket.
pub const OTHERS_LABEL: &str = "Others";

/// Efficiency score bands (score is 0-100).
pub const EFFICIENCY_HEALTHY: f64 = 75.0;
pub const EFFICIENCY_WATCH: f64 = 50.0;
