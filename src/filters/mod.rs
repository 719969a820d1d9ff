//! Shared filter state driving every dashboard query.
//!
//! The store is session-scoped: created when the dashboard shell mounts,
//! mutated by any filter control, reset by the "clear filters" action. The
//! optional dimensions form a hierarchy (department/environment above
//! version, version above agent) and changing a parent cascades a reset of
//! its children.

mod options;

pub use options::{agent_option_params, version_option_params, OptionParams};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Time range selection for all "over time" panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "24h")]
    Day,
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl TimeRange {
    /// Parse the wire/UI representation. Unknown values are rejected so the
    /// store can keep its previous range without surfacing an error.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "1h" => Some(Self::Hour),
            "24h" => Some(Self::Day),
            "7d" => Some(Self::Week),
            "30d" => Some(Self::Month),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "1h",
            Self::Day => "24h",
            Self::Week => "7d",
            Self::Month => "30d",
        }
    }

    /// Bucket granularity requested for trend endpoints at this range.
    pub fn granularity(&self) -> &'static str {
        match self {
            Self::Hour => "5m",
            Self::Day => "1h",
            Self::Week => "6h",
            Self::Month => "1d",
        }
    }
}

/// One filter dimension. Endpoints declare the subset they depend on and the
/// query cache uses that declaration for key derivation and invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDim {
    Range,
    Department,
    Environment,
    Version,
    Agent,
}

/// Current filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub range: TimeRange,
    pub department: Option<String>,
    pub environment: Option<String>,
    pub version: Option<String>,
    pub agent_id: Option<String>,
}

impl FilterState {
    /// True iff any optional dimension is set.
    pub fn is_filtered(&self) -> bool {
        self.department.is_some()
            || self.environment.is_some()
            || self.version.is_some()
            || self.agent_id.is_some()
    }

    fn has_parent_dimension(&self) -> bool {
        self.department.is_some() || self.environment.is_some() || self.version.is_some()
    }
}

/// Partial update applied to the store. Outer `None` leaves a field
/// untouched; `Some(None)` clears an optional dimension.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub range: Option<String>,
    pub department: Option<Option<String>>,
    pub environment: Option<Option<String>>,
    pub version: Option<Option<String>>,
    pub agent_id: Option<Option<String>>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value from the range control. Invalid values are silently ignored
    /// when the patch is applied.
    pub fn range(mut self, raw: &str) -> Self {
        self.range = Some(raw.to_string());
        self
    }

    pub fn department(mut self, value: Option<&str>) -> Self {
        self.department = Some(value.map(String::from));
        self
    }

    pub fn environment(mut self, value: Option<&str>) -> Self {
        self.environment = Some(value.map(String::from));
        self
    }

    pub fn version(mut self, value: Option<&str>) -> Self {
        self.version = Some(value.map(String::from));
        self
    }

    pub fn agent_id(mut self, value: Option<&str>) -> Self {
        self.agent_id = Some(value.map(String::from));
        self
    }
}

/// Which dimensions an update actually changed. Consumed by the query cache
/// to decide which keys to invalidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterChange {
    pub range: bool,
    pub department: bool,
    pub environment: bool,
    pub version: bool,
    pub agent_id: bool,
}

impl FilterChange {
    pub fn any(&self) -> bool {
        self.range || self.department || self.environment || self.version || self.agent_id
    }

    pub fn contains(&self, dim: FilterDim) -> bool {
        match dim {
            FilterDim::Range => self.range,
            FilterDim::Department => self.department,
            FilterDim::Environment => self.environment,
            FilterDim::Version => self.version,
            FilterDim::Agent => self.agent_id,
        }
    }
}

/// Session-scoped filter store. Late responses for superseded filters are
/// discarded at the cache layer: its keys embed the filter values active at
/// request time, so a completion is dropped when its key no longer matches
/// the current state.
pub struct FilterStore {
    state: RwLock<FilterState>,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(FilterState::default()),
        }
    }

    pub fn snapshot(&self) -> FilterState {
        self.state.read().clone()
    }

    pub fn is_filtered(&self) -> bool {
        self.state.read().is_filtered()
    }

    /// Merge a partial update into the current state.
    ///
    /// Changing `department` or `environment` clears `version` and
    /// `agent_id`; changing `version` clears `agent_id`. An `agent_id` update
    /// is dropped while no parent dimension is set, and clearing the last
    /// parent dimension also clears `agent_id`, so the store never holds an
    /// agent selection without at least one parent filter.
    pub fn apply(&self, patch: FilterPatch) -> FilterChange {
        let mut state = self.state.write();
        let mut change = FilterChange::default();

        if let Some(department) = patch.department {
            if state.department != department {
                state.department = department;
                change.department = true;
            }
        }

        if let Some(environment) = patch.environment {
            if state.environment != environment {
                state.environment = environment;
                change.environment = true;
            }
        }

        // Cascading reset: a parent change invalidates the child selections.
        if change.department || change.environment {
            if state.version.take().is_some() {
                change.version = true;
            }
            if state.agent_id.take().is_some() {
                change.agent_id = true;
            }
        }

        if let Some(version) = patch.version {
            if state.version != version {
                state.version = version;
                change.version = true;
                if state.agent_id.take().is_some() {
                    change.agent_id = true;
                }
            }
        }

        if let Some(agent_id) = patch.agent_id {
            if state.has_parent_dimension() && state.agent_id != agent_id {
                state.agent_id = agent_id;
                change.agent_id = true;
            }
        }

        // Guard the hierarchy invariant: no agent selection without a parent.
        if !state.has_parent_dimension() && state.agent_id.take().is_some() {
            change.agent_id = true;
        }

        if let Some(raw) = patch.range {
            // Invalid range values are ignored and the previous value kept.
            if let Some(range) = TimeRange::parse(&raw) {
                if state.range != range {
                    state.range = range;
                    change.range = true;
                }
            }
        }

        change
    }

    /// Restore defaults: range back to 7d, all optional dimensions cleared.
    pub fn reset(&self) -> FilterChange {
        let mut state = self.state.write();
        let change = FilterChange {
            range: state.range != TimeRange::default(),
            department: state.department.is_some(),
            environment: state.environment.is_some(),
            version: state.version.is_some(),
            agent_id: state.agent_id.is_some(),
        };

        *state = FilterState::default();

        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_change_cascades_to_version_and_agent() {
        let store = FilterStore::new();
        store.apply(
            FilterPatch::new()
                .department(Some("research"))
                .version(Some("2.1.0"))
                .agent_id(Some("agent-7")),
        );

        let change = store.apply(FilterPatch::new().department(Some("support")));
        assert!(change.department && change.version && change.agent_id);

        let state = store.snapshot();
        assert_eq!(state.department.as_deref(), Some("support"));
        assert_eq!(state.version, None);
        assert_eq!(state.agent_id, None);
    }

    #[test]
    fn environment_change_cascades_to_version_and_agent() {
        let store = FilterStore::new();
        store.apply(
            FilterPatch::new()
                .environment(Some("prod"))
                .version(Some("2.1.0"))
                .agent_id(Some("agent-7")),
        );

        store.apply(FilterPatch::new().environment(Some("staging")));

        let state = store.snapshot();
        assert_eq!(state.version, None);
        assert_eq!(state.agent_id, None);
    }

    #[test]
    fn version_change_clears_agent_only() {
        let store = FilterStore::new();
        store.apply(
            FilterPatch::new()
                .department(Some("research"))
                .version(Some("2.1.0"))
                .agent_id(Some("agent-7")),
        );

        store.apply(FilterPatch::new().version(Some("2.2.0")));

        let state = store.snapshot();
        assert_eq!(state.department.as_deref(), Some("research"));
        assert_eq!(state.version.as_deref(), Some("2.2.0"));
        assert_eq!(state.agent_id, None);
    }

    #[test]
    fn agent_requires_a_parent_dimension() {
        let store = FilterStore::new();
        let change = store.apply(FilterPatch::new().agent_id(Some("agent-7")));
        assert!(!change.any());
        assert_eq!(store.snapshot().agent_id, None);

        // Clearing the last parent also drops the agent selection.
        store.apply(
            FilterPatch::new()
                .department(Some("research"))
                .agent_id(Some("agent-7")),
        );
        store.apply(FilterPatch::new().department(None));
        assert_eq!(store.snapshot().agent_id, None);
    }

    #[test]
    fn invalid_range_is_ignored() {
        let store = FilterStore::new();
        store.apply(FilterPatch::new().range("24h"));

        let change = store.apply(FilterPatch::new().range("90d"));
        assert!(!change.any());
        assert_eq!(store.snapshot().range, TimeRange::Day);
    }

    #[test]
    fn noop_patch_reports_no_change() {
        let store = FilterStore::new();
        store.apply(FilterPatch::new().department(Some("research")));

        let change = store.apply(FilterPatch::new().department(Some("research")));
        assert!(!change.any());
        assert_eq!(store.snapshot().department.as_deref(), Some("research"));
    }

    #[test]
    fn reset_restores_defaults() {
        let store = FilterStore::new();
        store.apply(
            FilterPatch::new()
                .range("1h")
                .department(Some("research"))
                .version(Some("2.1.0")),
        );
        assert!(store.is_filtered());

        let change = store.reset();
        assert!(change.range && change.department && change.version);
        assert_eq!(store.snapshot(), FilterState::default());
        assert!(!store.is_filtered());
    }
}
