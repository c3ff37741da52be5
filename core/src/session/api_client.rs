//! Agent server client
//!
//! The [`SessionApi`] trait is the seam between the connection controller
//! and the network; [`HttpSessionApi`] is the reqwest implementation used
//! by the app.

use crate::config::AgentServerConfig;
use crate::session::error::ApiError;
use crate::session::types::{ApiResponse, ChannelRequest, SessionParams, StartServiceRequest};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const PING_PATH: &str = "/api/agents/ping";
const START_PATH: &str = "/api/agents/start";
const STOP_PATH: &str = "/api/agents/stop";

/// Start/stop/ping operations offered by the agent server
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Ask whether the session for `channel` is alive
    async fn ping(&self, channel: &str) -> Result<ApiResponse, ApiError>;

    /// Start an agent session
    async fn start_service(&self, params: &SessionParams) -> Result<ApiResponse, ApiError>;

    /// Stop the agent session for `channel`
    async fn stop_service(&self, channel: &str) -> Result<ApiResponse, ApiError>;
}

/// HTTP client for the agent server
#[derive(Debug, Clone)]
pub struct HttpSessionApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSessionApi {
    /// Build a client from configuration
    ///
    /// # Errors
    /// * Returns `ApiError::Request` if the underlying client cannot be built
    ///   (e.g. TLS backend initialisation failure).
    pub fn from_config(config: &AgentServerConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Wrap an existing client (shares its connection pool)
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Calling agent server");

        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            tracing::error!(
                url = %url,
                status_code = status.as_u16(),
                error_body = %body,
                "Agent server returned error status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed: ApiResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::Decode(format!("{} - Response body: {}", e, text)))?;

        tracing::debug!(url = %url, code = %parsed.code, "Agent server responded");
        Ok(parsed)
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn ping(&self, channel: &str) -> Result<ApiResponse, ApiError> {
        self.post(PING_PATH, &ChannelRequest::new(channel)).await
    }

    async fn start_service(&self, params: &SessionParams) -> Result<ApiResponse, ApiError> {
        self.post(START_PATH, &StartServiceRequest::from(params)).await
    }

    async fn stop_service(&self, channel: &str) -> Result<ApiResponse, ApiError> {
        self.post(STOP_PATH, &ChannelRequest::new(channel)).await
    }
}
