//! Data core for the agentlens analytics dashboard.
//!
//! The dashboard itself is a thin rendering layer; everything with actual
//! behavior lives here: the shared filter state that drives every panel, the
//! cascading option resolution for dependent filter dropdowns, the query
//! cache that dedupes and refreshes fetches against the platform REST API,
//! and the pure derivation pipelines that reshape raw JSON responses into
//! visualization models.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod filters;
pub mod normalize;
pub mod pipeline;
pub mod query;
