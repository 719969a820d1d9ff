//! Cascading option resolution for the dependent filter dropdowns.
//!
//! The version and agent dropdowns only offer values valid under the current
//! parent selection, so their option requests are a pure function of the
//! parent dimensions. Identical filter state resolves to structurally equal
//! params, which lets the query cache dedupe the option fetches.

use super::FilterState;

/// Request parameters for a dependent option list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionParams {
    pub department: Option<String>,
    pub environment: Option<String>,
    pub version: Option<String>,
}

impl OptionParams {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(department) = &self.department {
            pairs.push(("department", department.clone()));
        }
        if let Some(environment) = &self.environment {
            pairs.push(("environment", environment.clone()));
        }
        if let Some(version) = &self.version {
            pairs.push(("version", version.clone()));
        }
        pairs
    }
}

/// Params for the version dropdown: depends on department and environment
/// only. Recomputed whenever either parent changes.
pub fn version_option_params(state: &FilterState) -> OptionParams {
    OptionParams {
        department: state.department.clone(),
        environment: state.environment.clone(),
        version: None,
    }
}

/// Params for the agent dropdown. Returns `None` when no parent dimension is
/// set: the dropdown is not fetched at all rather than issuing an unbounded,
/// unfiltered request.
pub fn agent_option_params(state: &FilterState) -> Option<OptionParams> {
    if !state.has_parent_dimension() {
        return None;
    }

    Some(OptionParams {
        department: state.department.clone(),
        environment: state.environment.clone(),
        version: state.version.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{FilterPatch, FilterStore};

    #[test]
    fn identical_state_resolves_identical_params() {
        let store = FilterStore::new();
        store.apply(
            FilterPatch::new()
                .department(Some("research"))
                .environment(Some("prod")),
        );

        let a = store.snapshot();
        let b = store.snapshot();
        assert_eq!(version_option_params(&a), version_option_params(&b));
        assert_eq!(agent_option_params(&a), agent_option_params(&b));
    }

    #[test]
    fn version_params_ignore_version_and_agent() {
        let store = FilterStore::new();
        store.apply(
            FilterPatch::new()
                .department(Some("research"))
                .version(Some("2.1.0"))
                .agent_id(Some("agent-7")),
        );

        let params = version_option_params(&store.snapshot());
        assert_eq!(params.department.as_deref(), Some("research"));
        assert_eq!(params.version, None);
    }

    #[test]
    fn agent_options_not_fetched_without_parent() {
        assert_eq!(agent_option_params(&FilterState::default()), None);

        let store = FilterStore::new();
        store.apply(FilterPatch::new().environment(Some("prod")));
        let params = agent_option_params(&store.snapshot()).unwrap();
        assert_eq!(params.environment.as_deref(), Some("prod"));
        assert_eq!(
            params.query_pairs(),
            vec![("environment", "prod".to_string())]
        );
    }
}
