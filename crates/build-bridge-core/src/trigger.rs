//! Downstream build trigger abstraction.
//!
//! A routed webhook ends in a build trigger call: the configured job name
//! plus the extracted parameters. The trait keeps the request pipeline
//! independent of the build system's API; the HTTP implementation and the
//! recording test double live in [`crate::adapters`].

use crate::mapping::ExtractedParameters;
use crate::CorrelationId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// BuildHandle
// ============================================================================

/// Identity of a started build, as reported by the build system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildHandle {
    /// Build system's identifier for the started build.
    pub build_id: String,

    /// Link to the build, when the build system reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_url: Option<String>,
}

// ============================================================================
// BuildTrigger trait
// ============================================================================

/// Starts a build job with a set of parameters.
#[async_trait]
pub trait BuildTrigger: Send + Sync {
    /// Start `job` with `parameters`.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError`] when the build system rejects the request or
    /// cannot be reached.
    async fn trigger_build(
        &self,
        job: &str,
        parameters: &ExtractedParameters,
        correlation_id: &CorrelationId,
    ) -> Result<BuildHandle, TriggerError>;

    /// Whether the build system can currently accept requests.
    async fn health_check(&self) -> Result<(), TriggerError>;
}

// ============================================================================
// Error types
// ============================================================================

/// Build trigger failures.
///
/// `Clone` so test doubles can hand out a pre-configured failure per call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    /// The build system answered with a non-success status.
    #[error("build system rejected job '{job}' with status {status}: {message}")]
    Rejected {
        job: String,
        status: u16,
        message: String,
    },

    /// The build system could not be reached.
    #[error("build system unreachable: {message}")]
    Transport { message: String },

    /// The build system answered but the response could not be understood.
    #[error("unexpected build system response: {message}")]
    InvalidResponse { message: String },
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
