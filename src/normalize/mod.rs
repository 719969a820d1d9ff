//! Boundary normalization: converts nullable backend payloads into fully
//! populated internal models in one place, so pipeline code never re-checks
//! nullability.
//!
//! Fallbacks are uniform across all call sites: 0 for missing numbers, an
//! empty list for missing arrays, and the `"—"` display sentinel for missing
//! labels. Rows that cannot be placed at all (no timestamp on a time series,
//! no entity id on a quadrant point) are dropped rather than fabricated.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::pipeline::quadrant::EntityPoint;
use crate::pipeline::timeseries::SeriesRow;

/// Display placeholder for absent labels.
pub const DISPLAY_SENTINEL: &str = "—";

pub fn text_or_sentinel(value: Option<String>) -> String {
    value.unwrap_or_else(|| DISPLAY_SENTINEL.to_string())
}

pub fn num_or_zero(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

/// Endpoints respond either with the `{ data: [...], meta: {...} }` envelope
/// or a bare array. Anything else normalizes to zero rows.
fn rows(payload: &Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items.clone(),
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn parse_rows<T: for<'de> Deserialize<'de>>(payload: &Value) -> Vec<T> {
    rows(payload)
        .into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawCostRow {
    timestamp: Option<DateTime<Utc>>,
    model: Option<String>,
    total_cost_usd: Option<f64>,
}

/// Multi-model cost trend rows, ready for the time-bucket merge.
pub fn cost_trend_rows(payload: &Value) -> Vec<SeriesRow> {
    parse_rows::<RawCostRow>(payload)
        .into_iter()
        .filter_map(|raw| {
            let timestamp = raw.timestamp?;
            Some(SeriesRow {
                timestamp,
                key: text_or_sentinel(raw.model),
                value: num_or_zero(raw.total_cost_usd),
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawBreakdownRow {
    group: Option<String>,
    total_cost_usd: Option<f64>,
}

/// Grouped cost totals for the distribution pipeline.
pub fn cost_breakdown_rows(payload: &Value) -> Vec<(String, f64)> {
    parse_rows::<RawBreakdownRow>(payload)
        .into_iter()
        .map(|raw| {
            (
                text_or_sentinel(raw.group),
                num_or_zero(raw.total_cost_usd),
            )
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawLatencyRow {
    timestamp: Option<DateTime<Utc>>,
    p95_ms: Option<f64>,
}

/// Latency trend as (timestamp, p95) points.
pub fn latency_rows(payload: &Value) -> Vec<(DateTime<Utc>, f64)> {
    parse_rows::<RawLatencyRow>(payload)
        .into_iter()
        .filter_map(|raw| Some((raw.timestamp?, num_or_zero(raw.p95_ms))))
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawScorePoint {
    timestamp: Option<DateTime<Utc>>,
    avg_score: Option<f64>,
}

/// Averaged quality-score window used by drift classification, ordered by
/// timestamp.
pub fn score_window(payload: &Value) -> Vec<f64> {
    let mut points: Vec<(DateTime<Utc>, f64)> = parse_rows::<RawScorePoint>(payload)
        .into_iter()
        .filter_map(|raw| Some((raw.timestamp?, num_or_zero(raw.avg_score))))
        .collect();
    points.sort_by_key(|(timestamp, _)| *timestamp);
    points.into_iter().map(|(_, score)| score).collect()
}

#[derive(Debug, Deserialize)]
struct RawQuadrantRow {
    agent_id: Option<String>,
    cost_per_request: Option<f64>,
    quality_score: Option<f64>,
    p95_latency_ms: Option<f64>,
    request_count: Option<f64>,
}

/// Cost-vs-quality entities (x: cost per request, y: quality score).
pub fn cost_quality_points(payload: &Value) -> Vec<EntityPoint> {
    parse_rows::<RawQuadrantRow>(payload)
        .into_iter()
        .filter_map(|raw| {
            Some(EntityPoint {
                entity_id: raw.agent_id?,
                x_metric: num_or_zero(raw.cost_per_request),
                y_metric: num_or_zero(raw.quality_score),
                volume: num_or_zero(raw.request_count),
            })
        })
        .collect()
}

/// Cost-vs-performance entities (x: cost per request, y: p95 latency).
pub fn cost_performance_points(payload: &Value) -> Vec<EntityPoint> {
    parse_rows::<RawQuadrantRow>(payload)
        .into_iter()
        .filter_map(|raw| {
            Some(EntityPoint {
                entity_id: raw.agent_id?,
                x_metric: num_or_zero(raw.cost_per_request),
                y_metric: num_or_zero(raw.p95_latency_ms),
                volume: num_or_zero(raw.request_count),
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawAnomalyRow {
    timestamp: Option<DateTime<Utc>>,
    metric: Option<String>,
    expected_value: Option<f64>,
    actual_value: Option<f64>,
    deviation_pct: Option<f64>,
}

/// One observed point against its expected-value baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyPoint {
    pub timestamp: DateTime<Utc>,
    pub metric: String,
    pub expected_value: f64,
    pub actual_value: f64,
    pub deviation_pct: f64,
}

/// Anomaly points with the deviation derived from the baseline when the
/// backend omits it.
pub fn anomaly_points(payload: &Value) -> Vec<AnomalyPoint> {
    parse_rows::<RawAnomalyRow>(payload)
        .into_iter()
        .filter_map(|raw| {
            let timestamp = raw.timestamp?;
            let expected = num_or_zero(raw.expected_value);
            let actual = num_or_zero(raw.actual_value);
            let deviation_pct = match raw.deviation_pct {
                Some(deviation) => deviation,
                None if expected != 0.0 => (actual - expected) / expected * 100.0,
                None => 0.0,
            };
            Some(AnomalyPoint {
                timestamp,
                metric: text_or_sentinel(raw.metric),
                expected_value: expected,
                actual_value: actual,
                deviation_pct,
            })
        })
        .collect()
}

/// Platform-wide headline numbers. The payload is a bare object rather than
/// the list envelope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverviewSummary {
    pub total_cost_usd: f64,
    pub total_requests: f64,
    pub total_tokens: f64,
    pub error_rate: f64,
    pub avg_latency_ms: f64,
}

pub fn overview_summary(payload: &Value) -> OverviewSummary {
    #[derive(Deserialize, Default)]
    struct Raw {
        total_cost_usd: Option<f64>,
        total_requests: Option<f64>,
        total_tokens: Option<f64>,
        error_rate: Option<f64>,
        avg_latency_ms: Option<f64>,
    }

    let raw: Raw = serde_json::from_value(payload.clone()).unwrap_or_default();
    OverviewSummary {
        total_cost_usd: num_or_zero(raw.total_cost_usd),
        total_requests: num_or_zero(raw.total_requests),
        total_tokens: num_or_zero(raw.total_tokens),
        error_rate: num_or_zero(raw.error_rate),
        avg_latency_ms: num_or_zero(raw.avg_latency_ms),
    }
}

/// Option lists arrive either as bare strings or as `{id, name}` objects.
pub fn option_values(payload: &Value) -> Vec<String> {
    rows(payload)
        .into_iter()
        .filter_map(|row| match row {
            Value::String(value) => Some(value),
            Value::Object(map) => map
                .get("id")
                .or_else(|| map.get("name"))
                .and_then(|v| v.as_str().map(String::from)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tolerates_missing_fields_with_uniform_fallbacks() {
        let payload = json!({
            "data": [
                {"timestamp": "2024-01-01T00:00:00Z", "total_cost_usd": 10.0},
                {"timestamp": "2024-01-01T01:00:00Z", "model": "gpt-4"},
                {"model": "claude", "total_cost_usd": 5.0}
            ],
            "meta": {"page": 1}
        });

        let rows = cost_trend_rows(&payload);
        // The row with no timestamp cannot be placed on the time axis.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, DISPLAY_SENTINEL);
        assert_eq!(rows[0].value, 10.0);
        assert_eq!(rows[1].key, "gpt-4");
        assert_eq!(rows[1].value, 0.0);
    }

    #[test]
    fn bare_arrays_and_envelopes_both_parse() {
        let bare = json!([{"group": "gpt-4", "total_cost_usd": 12.5}]);
        let wrapped = json!({"data": [{"group": "gpt-4", "total_cost_usd": 12.5}]});
        assert_eq!(cost_breakdown_rows(&bare), cost_breakdown_rows(&wrapped));
    }

    #[test]
    fn unexpected_shapes_yield_zero_rows() {
        assert!(cost_trend_rows(&json!("nonsense")).is_empty());
        assert!(anomaly_points(&json!({"data": 42})).is_empty());
        assert_eq!(overview_summary(&json!([1, 2, 3])), OverviewSummary::default());
    }

    #[test]
    fn anomaly_deviation_derived_from_baseline_when_missing() {
        let payload = json!([{
            "timestamp": "2024-01-01T00:00:00Z",
            "metric": "cost",
            "expected_value": 100.0,
            "actual_value": 160.0
        }]);

        let points = anomaly_points(&payload);
        assert_eq!(points.len(), 1);
        assert!((points[0].deviation_pct - 60.0).abs() < 1e-9);
    }

    #[test]
    fn score_window_sorts_by_timestamp() {
        let payload = json!([
            {"timestamp": "2024-02-02T00:00:00Z", "avg_score": 8.0},
            {"timestamp": "2024-02-01T00:00:00Z", "avg_score": 7.0}
        ]);
        assert_eq!(score_window(&payload), vec![7.0, 8.0]);
    }

    #[test]
    fn option_values_accept_strings_and_objects() {
        let payload = json!({"data": ["2.1.0", {"id": "agent-7", "name": "Support"}, 42]});
        assert_eq!(option_values(&payload), vec!["2.1.0", "agent-7"]);
    }
}
