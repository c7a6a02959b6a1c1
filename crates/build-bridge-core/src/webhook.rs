//! Webhook request model and provider header handling.
//!
//! Providers identify themselves through their event header: Bitbucket
//! Server sends `x-event-key`, GitHub sends `x-github-event`. The raw body
//! bytes are kept alongside the parsed headers because signature validation
//! must run over the exact bytes received, before any JSON parsing.

use crate::{EventId, Timestamp};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============================================================================
// ProviderKind
// ============================================================================

/// The Git hosting provider that sent a webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Bitbucket Server / Data Center (`x-event-key` header).
    Bitbucket,

    /// GitHub / GitHub Enterprise (`x-github-event` header).
    Github,
}

impl ProviderKind {
    /// The ping event key this provider sends to verify hook configuration.
    pub fn ping_event(&self) -> &'static str {
        match self {
            ProviderKind::Bitbucket => "diagnostics:ping",
            ProviderKind::Github => "ping",
        }
    }

    /// Extract the payload action, where the provider carries one.
    ///
    /// GitHub events qualify the event kind with a top-level `action` field;
    /// Bitbucket Server encodes the action in the event key itself and has
    /// no separate field.
    pub fn action_of<'a>(&self, payload: &'a Value) -> Option<&'a str> {
        match self {
            ProviderKind::Github => payload.get("action").and_then(Value::as_str),
            ProviderKind::Bitbucket => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Bitbucket => write!(f, "bitbucket"),
            ProviderKind::Github => write!(f, "github"),
        }
    }
}

// ============================================================================
// WebhookHeaders
// ============================================================================

/// The provider-relevant subset of the request headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookHeaders {
    /// Provider detected from the event header.
    pub provider: ProviderKind,

    /// The event key as sent by the provider.
    pub event_key: String,

    /// Signature header value, when present (`x-hub-signature-256` wins over
    /// the legacy `x-hub-signature`).
    pub signature: Option<String>,

    /// Provider-assigned delivery identifier, when present.
    pub delivery_id: Option<String>,
}

impl WebhookHeaders {
    /// Build from a case-insensitive header lookup.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::UnknownProvider`] when neither provider event
    /// header is present.
    pub fn from_lookup<'a, F>(lookup: F) -> Result<Self, WebhookError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let (provider, event_key) = if let Some(key) = lookup("x-event-key") {
            (ProviderKind::Bitbucket, key.to_string())
        } else if let Some(event) = lookup("x-github-event") {
            (ProviderKind::Github, event.to_string())
        } else {
            return Err(WebhookError::UnknownProvider);
        };

        let signature = lookup("x-hub-signature-256")
            .or_else(|| lookup("x-hub-signature"))
            .map(str::to_string);

        let delivery_id = lookup("x-request-id")
            .or_else(|| lookup("x-github-delivery"))
            .map(str::to_string);

        Ok(Self {
            provider,
            event_key,
            signature,
            delivery_id,
        })
    }

    /// Whether this delivery is the provider's configuration ping.
    pub fn is_ping(&self) -> bool {
        self.event_key
            .eq_ignore_ascii_case(self.provider.ping_event())
    }
}

// ============================================================================
// WebhookRequest
// ============================================================================

/// A received webhook delivery: parsed headers plus the raw body bytes.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    /// Bridge-assigned event identifier.
    pub id: EventId,

    /// Parsed provider headers.
    pub headers: WebhookHeaders,

    /// Raw body bytes, exactly as received.
    pub body: Bytes,

    /// Ingestion time.
    pub received_at: Timestamp,
}

impl WebhookRequest {
    /// Create a request from parsed headers and the raw body.
    pub fn new(headers: WebhookHeaders, body: Bytes) -> Self {
        Self {
            id: EventId::new(),
            headers,
            body,
            received_at: Timestamp::now(),
        }
    }

    /// Parse the body as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::MalformedPayload`] when the body is not valid
    /// JSON or the top level is not an object.
    pub fn parse_payload(&self) -> Result<Value, WebhookError> {
        let value: Value =
            serde_json::from_slice(&self.body).map_err(|e| WebhookError::MalformedPayload {
                reason: e.to_string(),
            })?;
        if !value.is_object() {
            return Err(WebhookError::MalformedPayload {
                reason: "payload root is not a JSON object".to_string(),
            });
        }
        Ok(value)
    }
}

// ============================================================================
// Error types
// ============================================================================

/// Webhook ingestion failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    /// Neither provider event header is present.
    #[error("no recognized provider event header")]
    UnknownProvider,

    /// The request body is not a JSON object.
    #[error("malformed payload: {reason}")]
    MalformedPayload { reason: String },

    /// The hook is pinned to a different provider than the one detected.
    #[error("provider mismatch: hook expects {expected}, request came from {actual}")]
    ProviderMismatch {
        expected: ProviderKind,
        actual: ProviderKind,
    },
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
