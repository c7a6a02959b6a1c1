//! Environment-variable secret store.
//!
//! Secret names map to environment variables by uppercasing and replacing
//! every non-alphanumeric character with `_`, under a configurable prefix:
//! `webhook-signing-secret` with the default prefix resolves to
//! `BB_SECRET_WEBHOOK_SIGNING_SECRET`.

use crate::secrets::{SecretName, SecretStore, SecretStoreError, SecretValue};
use async_trait::async_trait;

const DEFAULT_PREFIX: &str = "BB_SECRET_";

/// A secret store backed by process environment variables.
#[derive(Debug, Clone)]
pub struct EnvSecretStore {
    prefix: String,
}

impl EnvSecretStore {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn variable_for(&self, name: &SecretName) -> String {
        let suffix: String = name
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", self.prefix, suffix)
    }
}

impl Default for EnvSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_secret(&self, name: &SecretName) -> Result<SecretValue, SecretStoreError> {
        let variable = self.variable_for(name);
        match std::env::var(&variable) {
            Ok(value) => Ok(SecretValue::new(value)),
            Err(std::env::VarError::NotPresent) => Err(SecretStoreError::NotFound {
                name: name.as_str().to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretStoreError::Backend {
                message: format!("variable '{variable}' is not valid unicode"),
            }),
        }
    }

    async fn health_check(&self) -> Result<(), SecretStoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "env_secret_store_tests.rs"]
mod tests;
