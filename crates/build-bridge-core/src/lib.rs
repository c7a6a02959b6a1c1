//! # Build-Bridge Core
//!
//! Core domain logic for the Build-Bridge webhook adapter.
//!
//! This crate contains the logic for turning Git hosting provider webhooks
//! (Bitbucket Server, GitHub) into downstream build invocations: validating
//! signatures, extracting payload fields via path expressions, routing events
//! to build targets, and rendering status callbacks.
//!
//! ## Architecture
//!
//! The core follows clean architecture principles:
//! - Business logic depends only on trait abstractions
//! - Infrastructure implementations are injected at runtime
//! - External collaborators (secret store, build API) are abstracted behind traits
//!
//! ## Usage
//!
//! ```rust
//! use build_bridge_core::path::PathExpression;
//!
//! let expr = PathExpression::parse("changes[type=UPDATE].toHash").unwrap();
//! let payload = serde_json::json!({
//!     "changes": [{"type": "UPDATE", "toHash": "abc123"}]
//! });
//! assert_eq!(expr.extract_scalar(&payload).as_deref(), Some("abc123"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use ulid::Ulid;
pub use uuid::Uuid;

/// Standard result type for build-bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

// ============================================================================
// Domain Identifier Types
// ============================================================================

/// Unique identifier for a received webhook delivery
///
/// Uses ULID for lexicographic sorting and global uniqueness. Generated at
/// ingestion when the provider does not supply a delivery identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Ulid);

impl EventId {
    /// Generate a new unique event ID
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Get string representation of event ID
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ulid = s.parse::<Ulid>().map_err(|_| ParseError::InvalidFormat {
            expected: "ULID format".to_string(),
            actual: s.to_string(),
        })?;
        Ok(Self(ulid))
    }
}

/// Identifier for tracing a request across the webhook, trigger, and callback calls
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate new correlation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, e.g. one received from an upstream header
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get string representation
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Time Types
// ============================================================================

/// UTC timestamp with microsecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create timestamp for current moment
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parse timestamp from RFC3339 string
    pub fn from_rfc3339(s: &str) -> Result<Self, ParseError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|_| ParseError::InvalidFormat {
                expected: "RFC3339 datetime".to_string(),
                actual: s.to_string(),
            })?
            .with_timezone(&Utc);
        Ok(Self(dt))
    }

    /// Convert to RFC3339 string
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Get underlying DateTime
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error type for string parsing failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid format: expected {expected}, got '{actual}'")]
    InvalidFormat { expected: String, actual: String },
}

/// Top-level error type for build-bridge operations
///
/// Aggregates the per-module error types so callers outside the request
/// pipeline (the CLI, startup wiring) can carry a single error.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Path expression error: {0}")]
    Path(#[from] path::PathError),

    #[error("Signature error: {0}")]
    Signature(#[from] signature::SignatureError),

    #[error("Hook configuration error: {0}")]
    HookConfig(#[from] hook_config::HookConfigError),

    #[error("Secret store error: {0}")]
    Secrets(#[from] secrets::SecretStoreError),

    #[error("Build trigger error: {0}")]
    Trigger(#[from] trigger::TriggerError),

    #[error("Callback error: {0}")]
    Callback(#[from] callback::CallbackError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] webhook::WebhookError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

// ============================================================================
// Module declarations
// ============================================================================

/// Path expression parsing and payload field extraction
pub mod path;

/// Configured name-to-path field mapping
pub mod mapping;

/// HMAC-SHA256 webhook signature validation
pub mod signature;

/// Event-to-build-target routing
pub mod routing;

/// Webhook request and provider header handling
pub mod webhook;

/// Hook configuration loading and validation
pub mod hook_config;

/// Secret store abstraction
pub mod secrets;

/// Downstream build trigger abstraction
pub mod trigger;

/// Status callback rendering and delivery
pub mod callback;

/// Infrastructure adapters (secret stores, build triggers)
pub mod adapters;

// Re-export key types for convenience
pub use adapters::{
    EnvSecretStore, HttpBuildTrigger, InMemorySecretStore, RecordedTrigger, RecordingBuildTrigger,
};
pub use callback::{render_template, BuildStatus, CallbackError, StatusCallbackSender};
pub use hook_config::{
    CallbackAuth, CallbackConfig, HookConfigError, HookConfiguration, HookDefinition,
    StaticParameter,
};
pub use mapping::{ExtractedParameters, FieldMapping, MappedField, MissingFieldPolicy};
pub use path::{PathError, PathExpression};
pub use routing::{Route, RoutingDecision, RoutingTable};
pub use secrets::{SecretName, SecretStore, SecretStoreError, SecretValue};
pub use signature::{HmacSha256Validator, SignatureError, SignatureValidator};
pub use trigger::{BuildHandle, BuildTrigger, TriggerError};
pub use webhook::{ProviderKind, WebhookError, WebhookHeaders, WebhookRequest};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
