//! Infrastructure adapters.
//!
//! Concrete implementations of the [`crate::secrets::SecretStore`] and
//! [`crate::trigger::BuildTrigger`] traits. The in-memory and recording
//! adapters exist for tests and local development; the environment store and
//! the HTTP trigger are the default production backends, and the AWS Secrets
//! Manager store is available behind the `aws` feature.

mod env_secret_store;
mod http_trigger;
mod memory_secret_store;
mod recording_trigger;

#[cfg(feature = "aws")]
mod aws_secrets_manager;

pub use env_secret_store::EnvSecretStore;
pub use http_trigger::HttpBuildTrigger;
pub use memory_secret_store::InMemorySecretStore;
pub use recording_trigger::{RecordedTrigger, RecordingBuildTrigger};

#[cfg(feature = "aws")]
pub use aws_secrets_manager::AwsSecretsManagerStore;
