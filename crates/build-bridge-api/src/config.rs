//! Configuration types for the HTTP service

use serde::{Deserialize, Serialize};

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Hook configuration source
    #[serde(default)]
    pub hooks: HooksConfig,

    /// Secret store settings
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Build trigger settings
    #[serde(default)]
    pub trigger: TriggerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Validate cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unparseable trigger URL or an unknown
    /// log level.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger.base_url.is_empty() {
            return Err(ConfigError::Missing {
                key: "trigger.base_url".to_string(),
            });
        }
        url::Url::parse(&self.trigger.base_url).map_err(|e| ConfigError::Invalid {
            message: format!("trigger.base_url is not a valid URL: {e}"),
        })?;

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::Invalid {
                    message: format!("unknown log level '{other}'"),
                })
            }
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,

    /// Enable CORS
    pub enable_cors: bool,

    /// Enable compression
    pub enable_compression: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            timeout_seconds: 30,
            shutdown_timeout_seconds: 30,
            max_body_size: 10 * 1024 * 1024, // 10MB
            enable_cors: true,
            enable_compression: true,
        }
    }
}

/// Where the hook configuration comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Path to the hook configuration file (YAML or JSON)
    pub config_file: Option<String>,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            config_file: Some("config/hooks.yaml".to_string()),
        }
    }
}

/// Secret store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    /// Process-local map; development and tests only
    Memory,

    /// Environment variables under a prefix
    Env,

    /// AWS Secrets Manager (requires the `aws` feature)
    Aws,
}

/// Secret store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Backend to use
    pub backend: SecretBackend,

    /// Variable prefix for the env backend
    pub env_prefix: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            backend: SecretBackend::Env,
            env_prefix: "BB_SECRET_".to_string(),
        }
    }
}

/// Build trigger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Base URL of the build API gateway
    pub base_url: String,

    /// Name of the bearer-token secret; unset disables authentication
    pub token_secret: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            token_secret: None,
            timeout_seconds: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,

    /// Log file path (optional)
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_path: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Configuration parsing failed: {0}")]
    Parsing(#[from] toml::de::Error),

    #[error("Configuration loading failed: {message}")]
    Load { message: String },
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
