//! Trend/drift classification over a rolling window of averaged scores.

use serde::Serialize;

use super::thresholds::DRIFT_THRESHOLD_PCT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Degrading,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriftResult {
    pub trend: Trend,
    pub drift_percentage: f64,
}

/// Split the window into leading and trailing halves and report the percent
/// change of the trailing mean against the leading mean, classified against
/// [`DRIFT_THRESHOLD_PCT`]. The sign of `drift_percentage` always agrees
/// with the trend: improving is positive, degrading negative.
pub fn classify_drift(window: &[f64]) -> DriftResult {
    if window.len() < 2 {
        return DriftResult {
            trend: Trend::Stable,
            drift_percentage: 0.0,
        };
    }

    let mid = window.len() / 2;
    let leading = mean(&window[..mid]);
    let trailing = mean(&window[mid..]);

    let drift_percentage = if leading.abs() < f64::EPSILON {
        if trailing.abs() < f64::EPSILON {
            0.0
        } else {
            // No baseline to compare against; report a full swing in the
            // direction of the trailing mean.
            100.0 * trailing.signum()
        }
    } else {
        (trailing - leading) / leading.abs() * 100.0
    };

    let trend = if drift_percentage > DRIFT_THRESHOLD_PCT {
        Trend::Improving
    } else if drift_percentage < -DRIFT_THRESHOLD_PCT {
        Trend::Degrading
    } else {
        Trend::Stable
    };

    DriftResult {
        trend,
        drift_percentage,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
