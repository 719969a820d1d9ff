//! Anomaly severity banding against fixed deviation breakpoints.
//!
//! Chart markers and the summary table both classify through
//! [`severity_for`]; deriving severity anywhere else would let the two views
//! disagree about the same point.

use serde::Serialize;

use super::thresholds::{
    ANOMALY_CRITICAL_PCT, ANOMALY_HIGH_PCT, ANOMALY_LOW_PCT, ANOMALY_MEDIUM_PCT,
};
use crate::normalize::AnomalyPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Severity for a deviation percentage, or `None` when the point is within
/// the lowest breakpoint and therefore not an anomaly. Direction does not
/// matter; only the magnitude is banded.
pub fn severity_for(deviation_pct: f64) -> Option<Severity> {
    let magnitude = deviation_pct.abs();

    if magnitude > ANOMALY_CRITICAL_PCT {
        Some(Severity::Critical)
    } else if magnitude > ANOMALY_HIGH_PCT {
        Some(Severity::High)
    } else if magnitude > ANOMALY_MEDIUM_PCT {
        Some(Severity::Medium)
    } else if magnitude > ANOMALY_LOW_PCT {
        Some(Severity::Low)
    } else {
        None
    }
}

/// One chart marker: an anomalous point with its banded severity.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyMarker {
    pub point: AnomalyPoint,
    pub severity: Severity,
}

/// Band a series of points into markers, dropping non-anomalous points.
pub fn band_points(points: &[AnomalyPoint]) -> Vec<AnomalyMarker> {
    points
        .iter()
        .filter_map(|point| {
            severity_for(point.deviation_pct).map(|severity| AnomalyMarker {
                point: point.clone(),
                severity,
            })
        })
        .collect()
}

/// Severity counts for the summary view. Computed from the same banding as
/// the markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeveritySummary {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl SeveritySummary {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.critical
    }
}

pub fn summarize(points: &[AnomalyPoint]) -> SeveritySummary {
    let mut summary = SeveritySummary::default();
    for marker in band_points(points) {
        match marker.severity {
            Severity::Low => summary.low += 1,
            Severity::Medium => summary.medium += 1,
            Severity::High => summary.high += 1,
            Severity::Critical => summary.critical += 1,
        }
    }
    summary
}
