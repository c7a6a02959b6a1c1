//! Field mapping: applying configured path expressions across a payload.
//!
//! A [`FieldMapping`] is an ordered list of output-parameter names paired
//! with [`PathExpression`]s. Applying it to a parsed payload produces the
//! [`ExtractedParameters`] passed to the downstream build trigger and to the
//! status callback renderer. Parameter order mirrors the configured order so
//! that logs and tests are reproducible.

use crate::path::{PathError, PathExpression};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

// ============================================================================
// MissingFieldPolicy
// ============================================================================

/// What to do when a mapped path does not match the payload.
///
/// The default is [`MissingFieldPolicy::Omit`]: the parameter is absent from
/// the output entirely. [`MissingFieldPolicy::EmptyString`] keeps the
/// parameter with an empty value for downstream jobs that require every
/// configured name to be present. Extraction misses never fail the request
/// either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Drop the parameter from the output.
    #[default]
    Omit,

    /// Keep the parameter with an empty string value.
    EmptyString,
}

// ============================================================================
// MappedField
// ============================================================================

/// One configured output parameter and the path that produces its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedField {
    /// Output parameter name (e.g. `TO_HASH`).
    pub name: String,

    /// Path expression evaluated against the payload.
    pub path: PathExpression,
}

// ============================================================================
// FieldMapping
// ============================================================================

/// An ordered name-to-path mapping, built once from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    fields: Vec<MappedField>,

    #[serde(default)]
    policy: MissingFieldPolicy,
}

impl FieldMapping {
    /// Create a mapping from already-parsed fields.
    pub fn new(fields: Vec<MappedField>, policy: MissingFieldPolicy) -> Self {
        Self { fields, policy }
    }

    /// Create a mapping from `(name, path string)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] for the first pair whose path fails to parse.
    pub fn from_pairs<I, N, P>(pairs: I, policy: MissingFieldPolicy) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: AsRef<str>,
    {
        let mut fields = Vec::new();
        for (name, path) in pairs {
            fields.push(MappedField {
                name: name.into(),
                path: PathExpression::parse(path.as_ref())?,
            });
        }
        Ok(Self { fields, policy })
    }

    /// Apply the mapping to a parsed payload.
    ///
    /// Each configured path is evaluated once; misses follow the configured
    /// [`MissingFieldPolicy`]. The output preserves configured order.
    pub fn map(&self, payload: &Value) -> ExtractedParameters {
        let mut parameters = ExtractedParameters::new();
        for field in &self.fields {
            match field.path.extract_scalar(payload) {
                Some(value) => parameters.set(&field.name, value),
                None => {
                    debug!(
                        parameter = %field.name,
                        path = %field.path,
                        "mapped path did not match payload"
                    );
                    if self.policy == MissingFieldPolicy::EmptyString {
                        parameters.set(&field.name, String::new());
                    }
                }
            }
        }
        parameters
    }

    /// The configured fields, in output order.
    pub fn fields(&self) -> &[MappedField] {
        &self.fields
    }

    /// The configured missing-field policy.
    pub fn policy(&self) -> MissingFieldPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// ExtractedParameters
// ============================================================================

/// The ordered name-to-value set produced per request.
///
/// Has no identity beyond a single request; passed to the build trigger and
/// merged with job metadata for callback rendering. Serializes as a JSON
/// object preserving insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedParameters {
    entries: Vec<(String, String)>,
}

impl ExtractedParameters {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any existing value under the same name.
    pub fn set(&mut self, name: &str, value: String) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name.to_string(), value));
        }
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Merge another parameter set into this one; `other` wins on collision.
    pub fn merge(&mut self, other: &ExtractedParameters) {
        for (name, value) in other.iter() {
            self.set(name, value.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ExtractedParameters {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl FromIterator<(String, String)> for ExtractedParameters {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut parameters = Self::new();
        for (name, value) in iter {
            parameters.set(&name, value);
        }
        parameters
    }
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
