//! Hook configuration loading and validation.
//!
//! A [`HookConfiguration`] holds the full set of configured hooks, keyed by
//! the hook identifier that appears in the webhook URL path. It is loaded
//! once at startup from a YAML or JSON document, validated up front, and
//! shared immutably across requests.

use crate::mapping::FieldMapping;
use crate::routing::RoutingTable;
use crate::secrets::SecretName;
use crate::webhook::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

// ============================================================================
// Configuration model
// ============================================================================

/// The full set of configured hooks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookConfiguration {
    /// Hooks keyed by the identifier used in the webhook URL path.
    #[serde(default)]
    pub hooks: HashMap<String, HookDefinition>,
}

/// Configuration for one hook endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookDefinition {
    /// Pin the hook to one provider; requests from the other provider are
    /// rejected. Unset accepts either.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,

    /// Name of the signing secret. Present enables signature validation for
    /// every delivery to this hook; absent disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_secret: Option<SecretName>,

    /// Downstream build job to trigger.
    pub job: String,

    /// Ordered routing table for this hook.
    #[serde(default)]
    pub routes: RoutingTable,

    /// Named field mappings referenced by the routes.
    #[serde(default)]
    pub mappings: HashMap<String, FieldMapping>,

    /// Fixed parameters added to every triggered build.
    #[serde(default)]
    pub static_parameters: Vec<StaticParameter>,

    /// Optional status callback posted after triggering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<CallbackConfig>,
}

impl HookDefinition {
    /// Look up a field mapping by name.
    pub fn field_mapping(&self, name: &str) -> Option<&FieldMapping> {
        self.mappings.get(name)
    }
}

/// A fixed name/value parameter attached to every build of a hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticParameter {
    pub name: String,
    pub value: String,
}

/// Status callback configuration.
///
/// `url` and `body` are `{{NAME}}` templates rendered against the extracted
/// parameters plus build metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackConfig {
    /// Callback URL template.
    pub url: String,

    /// JSON body template.
    pub body: String,

    /// Basic-auth credentials, resolved through the secret store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<CallbackAuth>,
}

/// Secret references for callback basic auth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackAuth {
    pub username_secret: SecretName,
    pub password_secret: SecretName,
}

// ============================================================================
// Loading and validation
// ============================================================================

impl HookConfiguration {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`HookConfigError::Parse`] on malformed YAML and validation
    /// errors for semantically broken hooks.
    pub fn from_yaml(content: &str) -> Result<Self, HookConfigError> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| HookConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document.
    pub fn from_json(content: &str) -> Result<Self, HookConfigError> {
        let config: Self = serde_json::from_str(content).map_err(|e| HookConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, dispatching on the extension (`.json` is JSON,
    /// everything else is YAML).
    pub fn load_from_file(path: &Path) -> Result<Self, HookConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| HookConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&content)?
        } else {
            Self::from_yaml(&content)?
        };

        info!(
            path = %path.display(),
            hooks = config.hooks.len(),
            "loaded hook configuration"
        );
        Ok(config)
    }

    /// Look up a hook by its URL path identifier.
    pub fn hook(&self, hook_id: &str) -> Option<&HookDefinition> {
        self.hooks.get(hook_id)
    }

    /// Validate cross-references inside the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first broken hook found: an empty job name, or a route
    /// referencing a mapping the hook does not define.
    pub fn validate(&self) -> Result<(), HookConfigError> {
        for (hook_id, hook) in &self.hooks {
            if hook_id.is_empty() {
                return Err(HookConfigError::EmptyHookId);
            }
            if hook.job.trim().is_empty() {
                return Err(HookConfigError::MissingJob {
                    hook: hook_id.clone(),
                });
            }
            for route in hook.routes.routes() {
                if !hook.mappings.contains_key(&route.mapping) {
                    return Err(HookConfigError::UnknownMapping {
                        hook: hook_id.clone(),
                        event: route.event.clone(),
                        mapping: route.mapping.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Error types
// ============================================================================

/// Hook configuration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookConfigError {
    /// The configuration file could not be read.
    #[error("cannot read hook configuration '{path}': {message}")]
    Io { path: String, message: String },

    /// The document is not valid YAML/JSON for the configuration model.
    #[error("cannot parse hook configuration: {message}")]
    Parse { message: String },

    /// A hook is keyed by an empty identifier.
    #[error("hook identifier must not be empty")]
    EmptyHookId,

    /// A hook has no build job.
    #[error("hook '{hook}' has no build job")]
    MissingJob { hook: String },

    /// A route references a mapping the hook does not define.
    #[error("hook '{hook}' route for '{event}' references unknown mapping '{mapping}'")]
    UnknownMapping {
        hook: String,
        event: String,
        mapping: String,
    },
}

#[cfg(test)]
#[path = "hook_config_tests.rs"]
mod tests;
