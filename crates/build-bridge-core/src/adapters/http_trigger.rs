//! HTTP build trigger.
//!
//! Talks to a generic build-API gateway: `POST /api/jobs/{job}/trigger`
//! with the extracted parameters as a JSON object, answered with the
//! started build's identity. Authentication is an optional bearer token
//! resolved from the secret store at startup.

use crate::mapping::ExtractedParameters;
use crate::secrets::SecretValue;
use crate::trigger::{BuildHandle, BuildTrigger, TriggerError};
use crate::CorrelationId;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

/// Build trigger backed by an HTTP build API.
#[derive(Debug, Clone)]
pub struct HttpBuildTrigger {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretValue>,
}

/// Wire form of the build API's trigger response.
#[derive(Debug, Deserialize)]
struct TriggerResponse {
    build_id: String,

    #[serde(default)]
    build_url: Option<String>,
}

impl HttpBuildTrigger {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    /// Use a pre-configured HTTP client (timeouts, proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Authenticate with a bearer token.
    pub fn with_token(mut self, token: SecretValue) -> Self {
        self.token = Some(token);
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TriggerError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TriggerError::InvalidResponse {
                message: "build API base URL cannot carry paths".to_string(),
            })?
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl BuildTrigger for HttpBuildTrigger {
    #[instrument(skip(self, parameters), fields(correlation_id = %correlation_id))]
    async fn trigger_build(
        &self,
        job: &str,
        parameters: &ExtractedParameters,
        correlation_id: &CorrelationId,
    ) -> Result<BuildHandle, TriggerError> {
        let url = self.endpoint(&["api", "jobs", job, "trigger"])?;
        debug!(url = %url, parameters = parameters.len(), "triggering build");

        let mut request = self
            .client
            .post(url)
            .header("x-correlation-id", correlation_id.as_str())
            .json(&json!({ "parameters": parameters }));

        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose());
        }

        let response = request.send().await.map_err(|e| TriggerError::Transport {
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TriggerError::Rejected {
                job: job.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let body: TriggerResponse =
            response
                .json()
                .await
                .map_err(|e| TriggerError::InvalidResponse {
                    message: e.to_string(),
                })?;

        Ok(BuildHandle {
            build_id: body.build_id,
            build_url: body.build_url,
        })
    }

    async fn health_check(&self) -> Result<(), TriggerError> {
        let url = self.endpoint(&["health"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TriggerError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriggerError::Rejected {
                job: "health".to_string(),
                status: status.as_u16(),
                message: "health endpoint answered non-success".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "http_trigger_tests.rs"]
mod tests;
