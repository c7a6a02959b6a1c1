//! Secret store abstraction.
//!
//! Signing secrets and callback credentials are referenced by name in hook
//! configuration and resolved through a [`SecretStore`] at request time, so
//! secret material never lives in configuration files. Resolved values are
//! wrapped in [`SecretValue`], which zeroes its memory on drop and redacts
//! itself from debug output.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

// ============================================================================
// SecretName
// ============================================================================

/// A validated reference to a secret in the configured store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecretName(String);

impl SecretName {
    /// Create a secret name.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError::InvalidName`] for empty names or names
    /// with surrounding whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, SecretStoreError> {
        let name = name.into();
        if name.is_empty() || name.trim() != name {
            return Err(SecretStoreError::InvalidName { name });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SecretName {
    type Error = SecretStoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SecretName> for String {
    fn from(name: SecretName) -> Self {
        name.0
    }
}

// ============================================================================
// SecretValue
// ============================================================================

/// A resolved secret.
///
/// The inner string is zeroed when the value is dropped. `Debug` and
/// `Display` never reveal the material.
#[derive(Clone)]
pub struct SecretValue(Zeroizing<String>);

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Access the secret material.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue(***)")
    }
}

// ============================================================================
// SecretStore trait
// ============================================================================

/// Resolves secret names to secret material.
///
/// Implementations live in [`crate::adapters`]: an in-memory store for
/// tests, an environment-variable store, and an AWS Secrets Manager backend
/// behind the `aws` feature.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret by name.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError::NotFound`] when the store has no secret
    /// under the name, or a backend error for transport failures.
    async fn get_secret(&self, name: &SecretName) -> Result<SecretValue, SecretStoreError>;

    /// Whether the store can currently serve requests.
    async fn health_check(&self) -> Result<(), SecretStoreError>;
}

// ============================================================================
// Error types
// ============================================================================

/// Secret store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretStoreError {
    /// The name is empty or carries surrounding whitespace.
    #[error("invalid secret name '{name}'")]
    InvalidName { name: String },

    /// The store has no secret under the name.
    #[error("secret '{name}' not found")]
    NotFound { name: String },

    /// The store rejected the caller's credentials.
    #[error("access denied to secret '{name}'")]
    AccessDenied { name: String },

    /// Transport or backend failure.
    #[error("secret store backend error: {message}")]
    Backend { message: String },
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;
