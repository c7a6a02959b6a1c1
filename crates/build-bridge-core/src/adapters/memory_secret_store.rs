//! In-memory secret store for tests and local development.

use crate::secrets::{SecretName, SecretStore, SecretStoreError, SecretValue};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A secret store backed by a process-local map.
#[derive(Debug, Clone, Default)]
pub struct InMemorySecretStore {
    secrets: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a secret.
    pub async fn insert(&self, name: &str, value: &str) {
        self.secrets
            .write()
            .await
            .insert(name.to_string(), value.to_string());
    }

    /// Remove a secret; returns whether it existed.
    pub async fn remove(&self, name: &str) -> bool {
        self.secrets.write().await.remove(name).is_some()
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get_secret(&self, name: &SecretName) -> Result<SecretValue, SecretStoreError> {
        self.secrets
            .read()
            .await
            .get(name.as_str())
            .map(|value| SecretValue::new(value.clone()))
            .ok_or_else(|| SecretStoreError::NotFound {
                name: name.as_str().to_string(),
            })
    }

    async fn health_check(&self) -> Result<(), SecretStoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_secret_store_tests.rs"]
mod tests;
