//! Time-bucket merge for stacked "over time" charts.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// One raw row: a value for one series (e.g. a model) at one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub timestamp: DateTime<Utc>,
    pub key: String,
    pub value: f64,
}

/// One merged record: every series value observed at this timestamp. Series
/// with no row at this timestamp are absent from the map, not zero, so
/// stacked-area renderers can show "no data" rather than "zero".
#[derive(Debug, Clone, PartialEq)]
pub struct StackedPoint {
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<String, f64>,
}

/// Group rows by timestamp into one record per bucket. Output is strictly
/// ascending by timestamp with unique timestamps regardless of input order;
/// the backend does not guarantee source ordering. Duplicate rows for the
/// same series within a bucket accumulate.
pub fn merge_time_buckets(rows: &[SeriesRow]) -> Vec<StackedPoint> {
    let mut buckets: BTreeMap<DateTime<Utc>, BTreeMap<String, f64>> = BTreeMap::new();

    for row in rows {
        *buckets
            .entry(row.timestamp)
            .or_default()
            .entry(row.key.clone())
            .or_insert(0.0) += row.value;
    }

    buckets
        .into_iter()
        .map(|(timestamp, values)| StackedPoint { timestamp, values })
        .collect()
}

/// Union of series keys across all buckets, for legends and stack ordering.
pub fn series_keys(points: &[StackedPoint]) -> Vec<String> {
    let mut keys: Vec<String> = points
        .iter()
        .flat_map(|point| point.values.keys().cloned())
        .collect();
    keys.sort();
    keys.dedup();
    keys
}
