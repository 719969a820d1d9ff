//! Panel registry: declarative definitions tying each panel to its endpoint
//! and to the pipeline that shapes its data. Rendering proper lives in the
//! web layer; this module is the last typed stop before props.

use serde_json::Value;

use crate::normalize;
use crate::pipeline::anomaly::{self, AnomalyMarker, SeveritySummary};
use crate::pipeline::distribution::{self, DistributionItem};
use crate::pipeline::drift::{self, DriftResult};
use crate::pipeline::quadrant::{self, QuadrantPoint};
use crate::pipeline::slo;
use crate::pipeline::timeseries::{self, StackedPoint};
use crate::query::Endpoint;

/// A derived visualization model, or an explicit empty state. Zero rows must
/// render as "no data for this range", never as an empty-looking chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartModel<T> {
    Empty,
    Ready(T),
}

impl<T> ChartModel<T> {
    fn from_rows(rows: Vec<T>) -> ChartModel<Vec<T>> {
        if rows.is_empty() {
            ChartModel::Empty
        } else {
            ChartModel::Ready(rows)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Stat,
    Stacked,
    Distribution,
    Drift,
    Quadrant,
    AnomalyTable,
    Gauge,
}

/// Static description of one dashboard panel.
#[derive(Debug, Clone, Copy)]
pub struct Panel {
    pub title: &'static str,
    pub id: &'static str,
    pub endpoint: Endpoint,
    pub kind: PanelKind,
}

pub fn panels() -> &'static [Panel] {
    &[
        Panel {
            title: "Overview",
            id: "overview",
            endpoint: Endpoint::Overview,
            kind: PanelKind::Stat,
        },
        Panel {
            title: "Cost by Model",
            id: "cost-trend",
            endpoint: Endpoint::CostTrend,
            kind: PanelKind::Stacked,
        },
        Panel {
            title: "Cost Breakdown",
            id: "cost-breakdown",
            endpoint: Endpoint::CostBreakdown,
            kind: PanelKind::Distribution,
        },
        Panel {
            title: "p95 Latency",
            id: "latency-slo",
            endpoint: Endpoint::LatencyTrend,
            kind: PanelKind::Gauge,
        },
        Panel {
            title: "Quality Drift",
            id: "quality-drift",
            endpoint: Endpoint::QualityDrift,
            kind: PanelKind::Drift,
        },
        Panel {
            title: "Anomalies",
            id: "anomalies",
            endpoint: Endpoint::Anomalies,
            kind: PanelKind::AnomalyTable,
        },
        Panel {
            title: "Cost vs Quality",
            id: "cost-quality",
            endpoint: Endpoint::CostQualityQuadrant,
            kind: PanelKind::Quadrant,
        },
        Panel {
            title: "Cost vs Performance",
            id: "cost-performance",
            endpoint: Endpoint::CostPerformanceQuadrant,
            kind: PanelKind::Quadrant,
        },
    ]
}

/// Stacked multi-model cost trend.
pub fn build_cost_trend(payload: &Value) -> ChartModel<Vec<StackedPoint>> {
    let rows = normalize::cost_trend_rows(payload);
    ChartModel::<StackedPoint>::from_rows(timeseries::merge_time_buckets(&rows))
}

/// Ranked cost distribution with the Others bucket.
pub fn build_cost_breakdown(payload: &Value) -> ChartModel<Vec<DistributionItem>> {
    let rows = normalize::cost_breakdown_rows(payload);
    ChartModel::<DistributionItem>::from_rows(distribution::rank_top(&rows))
}

/// Drift classification over the averaged-score window.
pub fn build_quality_drift(payload: &Value) -> ChartModel<DriftResult> {
    let window = normalize::score_window(payload);
    if window.is_empty() {
        return ChartModel::Empty;
    }
    ChartModel::Ready(drift::classify_drift(&window))
}

/// Cost-vs-quality quadrant map.
pub fn build_cost_quality(payload: &Value) -> ChartModel<Vec<QuadrantPoint>> {
    let points = normalize::cost_quality_points(payload);
    ChartModel::<QuadrantPoint>::from_rows(quadrant::classify_quadrants(&points))
}

/// Cost-vs-performance quadrant map.
pub fn build_cost_performance(payload: &Value) -> ChartModel<Vec<QuadrantPoint>> {
    let points = normalize::cost_performance_points(payload);
    ChartModel::<QuadrantPoint>::from_rows(quadrant::classify_quadrants(&points))
}

/// Anomaly chart markers plus the table summary, derived from the same
/// banding so the two views always agree.
pub fn build_anomalies(payload: &Value) -> ChartModel<(Vec<AnomalyMarker>, SeveritySummary)> {
    let points = normalize::anomaly_points(payload);
    if points.is_empty() {
        return ChartModel::Empty;
    }
    let markers = anomaly::band_points(&points);
    let summary = anomaly::summarize(&points);
    ChartModel::Ready((markers, summary))
}

/// p95 latency SLO compliance for the gauge.
pub fn build_latency_slo(payload: &Value, target_ms: f64) -> ChartModel<f64> {
    let values: Vec<f64> = normalize::latency_rows(payload)
        .into_iter()
        .map(|(_, p95)| p95)
        .collect();
    match slo::compliance_ratio(&values, target_ms) {
        Some(ratio) => ChartModel::Ready(ratio),
        None => ChartModel::Empty,
    }
}
