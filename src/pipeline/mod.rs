//! Pure derivation pipelines: one per visualization family, each a function
//! from normalized rows to a visualization model. Nothing here touches the
//! network or the cache.

pub mod anomaly;
pub mod distribution;
pub mod drift;
pub mod quadrant;
pub mod slo;
pub mod thresholds;
pub mod timeseries;
