//! HTTP client for the platform REST API.
//!
//! Every request goes to a versioned prefix (`/api/v1`), carries the
//! workspace tenant header, and is parameterized by the filter subset the
//! endpoint declares. Responses are consumed as raw JSON; shaping happens in
//! the normalize/pipeline layers.

use serde_json::Value;
use thiserror::Error;

use crate::config::ApiConfig;

/// Tenant header attached to every request.
pub const WORKSPACE_HEADER: &str = "x-workspace-id";

const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("backend returned HTTP {status} for {path}")]
    Status { status: u16, path: String },
    #[error("malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    workspace: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            workspace: config.workspace.clone(),
        })
    }

    /// GET a JSON document from one logical endpoint. Timeouts surface as
    /// transport failures per the client-wide timeout.
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = format!("{}{API_PREFIX}{path}", self.base_url);

        let response = self
            .http
            .get(&url)
            .header(WORKSPACE_HEADER, &self.workspace)
            .query(params)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = response.bytes().await.map_err(ApiError::Transport)?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}
