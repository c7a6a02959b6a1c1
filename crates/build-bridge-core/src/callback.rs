//! Status callback rendering and delivery.
//!
//! After a build is triggered, the bridge can report the outcome back to the
//! provider (e.g. the Bitbucket build-status API). The callback URL and body
//! are configured as templates with `{{NAME}}` placeholders, rendered from
//! the extracted parameters plus build metadata. Placeholders with no value
//! are left verbatim so a misconfigured name is visible at the receiver
//! instead of silently collapsing to an empty string.
//!
//! Callback delivery is best-effort: the caller logs failures but never
//! fails the webhook response over them.

use crate::hook_config::CallbackConfig;
use crate::mapping::ExtractedParameters;
use crate::secrets::{SecretStore, SecretStoreError};
use regex::{Captures, Regex};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, instrument};

// ============================================================================
// Template rendering
// ============================================================================

static TEMPLATE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn template_pattern() -> &'static Regex {
    // The pattern is a literal; it cannot fail to compile.
    TEMPLATE_PATTERN.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("literal pattern"))
}

/// Render a `{{NAME}}` template against a parameter set.
///
/// Placeholders without a matching parameter are left verbatim.
pub fn render_template(template: &str, values: &ExtractedParameters) -> String {
    template_pattern()
        .replace_all(template, |caps: &Captures<'_>| match values.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

// ============================================================================
// BuildStatus
// ============================================================================

/// Build state reported through the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// The build was accepted and is running.
    InProgress,

    /// The build finished successfully.
    Successful,

    /// The build could not be started or failed.
    Failed,
}

impl BuildStatus {
    /// The wire form expected by provider build-status APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::InProgress => "INPROGRESS",
            BuildStatus::Successful => "SUCCESSFUL",
            BuildStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// StatusCallbackSender
// ============================================================================

/// Delivers rendered status callbacks over HTTP.
#[derive(Debug, Clone, Default)]
pub struct StatusCallbackSender {
    client: reqwest::Client,
}

impl StatusCallbackSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a pre-configured HTTP client (timeouts, proxies).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Render and deliver one callback.
    ///
    /// The URL and body templates are rendered against `values`; basic-auth
    /// credentials, when configured, are resolved through the secret store
    /// at send time.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError`] when the rendered URL is invalid, a
    /// credential secret cannot be resolved, the receiver is unreachable, or
    /// it answers with a non-success status.
    #[instrument(skip(self, config, values, secrets), fields(url_template = %config.url))]
    pub async fn send(
        &self,
        config: &CallbackConfig,
        values: &ExtractedParameters,
        secrets: &dyn SecretStore,
    ) -> Result<(), CallbackError> {
        let url = render_template(&config.url, values);
        let url = url::Url::parse(&url).map_err(|_| CallbackError::InvalidUrl { url })?;

        let body = render_template(&config.body, values);
        debug!(url = %url, "sending status callback");

        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(auth) = &config.auth {
            let username = secrets.get_secret(&auth.username_secret).await?;
            let password = secrets.get_secret(&auth.password_secret).await?;
            request = request.basic_auth(username.expose(), Some(password.expose()));
        }

        let response = request.send().await.map_err(|e| CallbackError::Transport {
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CallbackError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Error types
// ============================================================================

/// Status callback failures.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    /// The rendered URL is not a valid absolute URL.
    #[error("rendered callback URL is invalid: '{url}'")]
    InvalidUrl { url: String },

    /// A credential secret could not be resolved.
    #[error("callback credential error: {0}")]
    Secrets(#[from] SecretStoreError),

    /// The receiver could not be reached.
    #[error("callback transport error: {message}")]
    Transport { message: String },

    /// The receiver answered with a non-success status.
    #[error("callback rejected with status {status}")]
    Rejected { status: u16 },
}

#[cfg(test)]
#[path = "callback_tests.rs"]
mod tests;
