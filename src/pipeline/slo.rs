//! Ratio and delta derivations: SLO compliance, period-over-period trend
//! deltas, and efficiency banding.

use serde::Serialize;

use super::thresholds::{EFFICIENCY_HEALTHY, EFFICIENCY_WATCH};

/// Share of points meeting the target (values at or below it), in percent.
/// `None` for an empty window: zero rows is "no data for this range", not
/// 0% or 100% compliance.
pub fn compliance_ratio(values: &[f64], target: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let met = values.iter().filter(|value| **value <= target).count();
    Some(met as f64 / values.len() as f64 * 100.0)
}

/// Percent change of the current window versus the previous one. A zero
/// previous window reports a full swing in the direction of the current
/// value, mirroring the drift derivation.
pub fn trend_delta(current: f64, previous: f64) -> f64 {
    if previous.abs() < f64::EPSILON {
        if current.abs() < f64::EPSILON {
            0.0
        } else {
            100.0 * current.signum()
        }
    } else {
        (current - previous) / previous.abs() * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyBand {
    Healthy,
    Watch,
    AtRisk,
}

/// Band an efficiency score (0-100) for the status badge.
pub fn efficiency_band(score: f64) -> EfficiencyBand {
    if score >= EFFICIENCY_HEALTHY {
        EfficiencyBand::Healthy
    } else if score >= EFFICIENCY_WATCH {
        EfficiencyBand::Watch
    } else {
        EfficiencyBand::AtRisk
    }
}
