//! Query identity: each data source declares the filter dimensions it
//! depends on, and its cache key is derived from exactly that subset. A
//! change to a dimension an endpoint does not declare never alters its key
//! and never triggers a refetch.

mod cache;

pub use cache::{QueryCache, QuerySnapshot, QueryStatus};

use std::fmt::Write as _;
use std::time::Duration;

use crate::filters::{agent_option_params, version_option_params, FilterDim, FilterState};

/// Logical data sources consumed by the dashboard panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Overview,
    CostTrend,
    CostBreakdown,
    LatencyTrend,
    QualityScores,
    QualityDrift,
    Anomalies,
    CostQualityQuadrant,
    CostPerformanceQuadrant,
    SloStatus,
    VersionOptions,
    AgentOptions,
}

impl Endpoint {
    pub fn all() -> &'static [Endpoint] {
        &[
            Endpoint::Overview,
            Endpoint::CostTrend,
            Endpoint::CostBreakdown,
            Endpoint::LatencyTrend,
            Endpoint::QualityScores,
            Endpoint::QualityDrift,
            Endpoint::Anomalies,
            Endpoint::CostQualityQuadrant,
            Endpoint::CostPerformanceQuadrant,
            Endpoint::SloStatus,
            Endpoint::VersionOptions,
            Endpoint::AgentOptions,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Overview => "overview",
            Endpoint::CostTrend => "cost_trend",
            Endpoint::CostBreakdown => "cost_breakdown",
            Endpoint::LatencyTrend => "latency_trend",
            Endpoint::QualityScores => "quality_scores",
            Endpoint::QualityDrift => "quality_drift",
            Endpoint::Anomalies => "anomalies",
            Endpoint::CostQualityQuadrant => "cost_quality_quadrant",
            Endpoint::CostPerformanceQuadrant => "cost_performance_quadrant",
            Endpoint::SloStatus => "slo_status",
            Endpoint::VersionOptions => "version_options",
            Endpoint::AgentOptions => "agent_options",
        }
    }

    /// REST path under the versioned API prefix.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Overview => "/metrics/overview",
            Endpoint::CostTrend => "/costs/trend",
            Endpoint::CostBreakdown => "/costs/breakdown",
            Endpoint::LatencyTrend => "/performance/latency",
            Endpoint::QualityScores => "/quality/scores",
            Endpoint::QualityDrift => "/quality/drift",
            Endpoint::Anomalies => "/anomalies",
            Endpoint::CostQualityQuadrant => "/analytics/cost-quality",
            Endpoint::CostPerformanceQuadrant => "/analytics/cost-performance",
            Endpoint::SloStatus => "/slo/status",
            Endpoint::VersionOptions => "/filters/versions",
            Endpoint::AgentOptions => "/filters/agents",
        }
    }

    /// The filter dimensions this endpoint depends on.
    pub fn dimensions(&self) -> &'static [FilterDim] {
        use FilterDim::*;
        match self {
            Endpoint::Overview
            | Endpoint::CostTrend
            | Endpoint::CostBreakdown
            | Endpoint::LatencyTrend
            | Endpoint::QualityScores
            | Endpoint::QualityDrift
            | Endpoint::Anomalies => &[Range, Department, Environment, Version, Agent],
            // Quadrant maps plot one point per agent, so the agent dimension
            // does not narrow them.
            Endpoint::CostQualityQuadrant | Endpoint::CostPerformanceQuadrant => {
                &[Range, Department, Environment, Version]
            }
            // SLO targets are defined per department/environment, not per
            // deployed version or agent.
            Endpoint::SloStatus => &[Range, Department, Environment],
            Endpoint::VersionOptions => &[Department, Environment],
            Endpoint::AgentOptions => &[Department, Environment, Version],
        }
    }

    /// Minimum refresh interval: volatile sources every 30s, slow-moving
    /// backend computations every 5 minutes.
    pub fn refresh_interval(&self) -> Duration {
        match self {
            Endpoint::Overview | Endpoint::LatencyTrend => Duration::from_secs(30),
            Endpoint::CostTrend
            | Endpoint::CostBreakdown
            | Endpoint::QualityScores
            | Endpoint::SloStatus => Duration::from_secs(60),
            Endpoint::CostQualityQuadrant | Endpoint::CostPerformanceQuadrant => {
                Duration::from_secs(120)
            }
            Endpoint::QualityDrift
            | Endpoint::Anomalies
            | Endpoint::VersionOptions
            | Endpoint::AgentOptions => Duration::from_secs(300),
        }
    }
}

/// Query-string pairs for this endpoint under the given filter state,
/// restricted to the declared dimensions.
pub fn filter_params(endpoint: Endpoint, state: &FilterState) -> Vec<(&'static str, String)> {
    // Option endpoints resolve through the cascade rules rather than the
    // plain dimension projection.
    match endpoint {
        Endpoint::VersionOptions => return version_option_params(state).query_pairs(),
        Endpoint::AgentOptions => {
            return agent_option_params(state)
                .map(|params| params.query_pairs())
                .unwrap_or_default()
        }
        _ => {}
    }

    let mut pairs = Vec::new();
    for dim in endpoint.dimensions() {
        match dim {
            FilterDim::Range => {
                pairs.push(("range", state.range.as_str().to_string()));
            }
            FilterDim::Department => {
                if let Some(department) = &state.department {
                    pairs.push(("department", department.clone()));
                }
            }
            FilterDim::Environment => {
                if let Some(environment) = &state.environment {
                    pairs.push(("environment", environment.clone()));
                }
            }
            FilterDim::Version => {
                if let Some(version) = &state.version {
                    pairs.push(("version", version.clone()));
                }
            }
            FilterDim::Agent => {
                if let Some(agent_id) = &state.agent_id {
                    pairs.push(("agent_id", agent_id.clone()));
                }
            }
        }
    }

    if trend_endpoint(endpoint) {
        pairs.push(("granularity", state.range.granularity().to_string()));
    }

    pairs
}

fn trend_endpoint(endpoint: Endpoint) -> bool {
    matches!(
        endpoint,
        Endpoint::CostTrend | Endpoint::LatencyTrend | Endpoint::QualityScores
    )
}

/// Identity of one cached fetch: the endpoint plus its relevant filter
/// subset. Two panels reading the same endpoint under the same effective
/// filters share one in-flight request and one cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    endpoint: Endpoint,
    params: String,
}

impl QueryKey {
    pub fn new(endpoint: Endpoint, state: &FilterState) -> Self {
        let mut params = String::new();
        for (name, value) in filter_params(endpoint, state) {
            if !params.is_empty() {
                params.push('&');
            }
            let _ = write!(params, "{name}={value}");
        }

        Self { endpoint, params }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}?{}", self.endpoint.name(), self.params)
    }
}
