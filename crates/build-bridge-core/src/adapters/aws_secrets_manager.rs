//! AWS Secrets Manager secret store (behind the `aws` feature).

use crate::secrets::{SecretName, SecretStore, SecretStoreError, SecretValue};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::Client;
use tracing::debug;

/// A secret store backed by AWS Secrets Manager.
///
/// Credentials and region come from the standard AWS environment (profile,
/// instance role, or explicit variables).
#[derive(Debug, Clone)]
pub struct AwsSecretsManagerStore {
    client: Client,
}

impl AwsSecretsManagerStore {
    /// Build a store from the ambient AWS configuration.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&config),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for AwsSecretsManagerStore {
    async fn get_secret(&self, name: &SecretName) -> Result<SecretValue, SecretStoreError> {
        debug!(secret = %name, "fetching secret from AWS Secrets Manager");

        let output = self
            .client
            .get_secret_value()
            .secret_id(name.as_str())
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_resource_not_found_exception() {
                    SecretStoreError::NotFound {
                        name: name.as_str().to_string(),
                    }
                } else {
                    SecretStoreError::Backend {
                        message: service_error.to_string(),
                    }
                }
            })?;

        match output.secret_string() {
            Some(value) => Ok(SecretValue::new(value.to_string())),
            None => Err(SecretStoreError::Backend {
                message: format!("secret '{name}' has no string value"),
            }),
        }
    }

    async fn health_check(&self) -> Result<(), SecretStoreError> {
        self.client
            .list_secrets()
            .max_results(1)
            .send()
            .await
            .map_err(|e| SecretStoreError::Backend {
                message: e.to_string(),
            })?;
        Ok(())
    }
}
