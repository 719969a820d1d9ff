//! TOML configuration for the agentlens binary.

use ringlog::Level;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::query::Endpoint;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("invalid config {path}: {e}"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Workspace identifier sent as the tenant header.
    #[serde(default = "default_workspace")]
    pub workspace: String,
    #[serde(
        default = "default_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub timeout: Duration,
    /// p95 latency target for the SLO gauge, in milliseconds.
    #[serde(default = "default_latency_slo_ms")]
    pub latency_slo_ms: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            workspace: default_workspace(),
            timeout: default_timeout(),
            latency_slo_ms: default_latency_slo_ms(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LogConfig {
    pub fn level(&self) -> Level {
        match self.level.as_str() {
            "error" => Level::Error,
            "warn" => Level::Warn,
            "debug" => Level::Debug,
            "trace" => Level::Trace,
            _ => Level::Info,
        }
    }
}

/// Optional per-endpoint refresh overrides, e.g. `overview = "15s"`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshConfig {
    #[serde(default)]
    pub intervals: HashMap<String, String>,
}

impl RefreshConfig {
    pub fn resolve(&self) -> anyhow::Result<HashMap<Endpoint, Duration>> {
        let mut overrides = HashMap::new();
        for (name, raw) in &self.intervals {
            let endpoint = Endpoint::all()
                .iter()
                .find(|endpoint| endpoint.name() == name)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("unknown endpoint in refresh config: {name}"))?;
            let interval = humantime::parse_duration(raw)
                .map_err(|e| anyhow::anyhow!("invalid refresh interval for {name}: {e}"))?;
            overrides.insert(endpoint, interval);
        }
        Ok(overrides)
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_workspace() -> String {
    "default".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_latency_slo_ms() -> f64 {
    500.0
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert!(config.refresh.resolve().unwrap().is_empty());
    }

    #[test]
    fn refresh_overrides_resolve_to_endpoints() {
        let config: Config = toml::from_str(
            r#"
            [refresh.intervals]
            overview = "15s"
            anomalies = "2m"
            "#,
        )
        .unwrap();

        let overrides = config.refresh.resolve().unwrap();
        assert_eq!(
            overrides.get(&Endpoint::Overview),
            Some(&Duration::from_secs(15))
        );
        assert_eq!(
            overrides.get(&Endpoint::Anomalies),
            Some(&Duration::from_secs(120))
        );
    }

    #[test]
    fn unknown_endpoint_in_refresh_is_rejected() {
        let config: Config = toml::from_str(
            r#"
            [refresh.intervals]
            nonsense = "15s"
            "#,
        )
        .unwrap();
        assert!(config.refresh.resolve().is_err());
    }

    #[test]
    fn api_section_parses_humantime_timeout() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://metrics.internal"
            workspace = "acme"
            timeout = "5s"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.timeout, Duration::from_secs(5));
        assert_eq!(config.api.workspace, "acme");
    }
}
