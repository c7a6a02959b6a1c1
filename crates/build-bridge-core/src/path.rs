//! Path expressions for addressing values inside a JSON payload.
//!
//! A path expression is a dot-separated string where each segment is either
//! an object key (`repository.slug`), an indexed key (`changes[0]`), or a
//! filtered key (`changes[type=UPDATE]`) that selects the **first** element
//! of an array whose named field equals the given value.
//!
//! Evaluation is left-to-right and short-circuits to "not found" on any
//! missing segment; extraction failures are data-level, never errors.
//!
//! # Examples
//!
//! ```rust
//! use build_bridge_core::path::PathExpression;
//!
//! let expr = PathExpression::parse("changes[type=UPDATE].ref.displayId").unwrap();
//! let payload = serde_json::json!({
//!     "changes": [
//!         {"type": "ADD", "ref": {"displayId": "feature"}},
//!         {"type": "UPDATE", "ref": {"displayId": "main"}}
//!     ]
//! });
//! assert_eq!(expr.extract_scalar(&payload).as_deref(), Some("main"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Segment
// ============================================================================

/// A single step of a path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object member access: `repository`.
    Key(String),

    /// Array element access by position: `changes[0]`.
    IndexedKey { key: String, index: usize },

    /// First-match array selection: `changes[type=UPDATE]` resolves `changes`
    /// to an array and selects the first element whose `type` field equals
    /// `UPDATE` (string comparison).
    FilteredKey {
        key: String,
        field: String,
        value: String,
    },
}

// ============================================================================
// PathExpression
// ============================================================================

/// A parsed, validated path expression.
///
/// Construction via [`PathExpression::parse`] validates the syntax up front
/// so that configuration errors surface at startup rather than per request.
/// Evaluation against a payload never fails; an unmatched path yields `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathExpression {
    raw: String,
    segments: Vec<Segment>,
}

impl PathExpression {
    /// Parse a path expression string.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] when the expression is empty, contains an empty
    /// segment, has unbalanced brackets, or carries a filter without a
    /// `field=value` form.
    pub fn parse(expr: &str) -> Result<Self, PathError> {
        if expr.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for (position, part) in expr.split('.').enumerate() {
            if part.is_empty() {
                return Err(PathError::EmptySegment { position });
            }
            segments.push(Self::parse_segment(part, position)?);
        }

        Ok(Self {
            raw: expr.to_string(),
            segments,
        })
    }

    fn parse_segment(part: &str, position: usize) -> Result<Segment, PathError> {
        let Some(open) = part.find('[') else {
            if part.contains(']') {
                return Err(PathError::UnbalancedBrackets {
                    segment: part.to_string(),
                    position,
                });
            }
            return Ok(Segment::Key(part.to_string()));
        };

        let key = &part[..open];
        if key.is_empty() {
            return Err(PathError::EmptySegment { position });
        }

        let Some(inner) = part[open + 1..].strip_suffix(']') else {
            return Err(PathError::UnbalancedBrackets {
                segment: part.to_string(),
                position,
            });
        };
        if inner.contains('[') || inner.contains(']') {
            return Err(PathError::UnbalancedBrackets {
                segment: part.to_string(),
                position,
            });
        }

        if let Ok(index) = inner.parse::<usize>() {
            return Ok(Segment::IndexedKey {
                key: key.to_string(),
                index,
            });
        }

        let Some((field, value)) = inner.split_once('=') else {
            return Err(PathError::InvalidFilter {
                segment: part.to_string(),
                position,
            });
        };
        if field.is_empty() || value.is_empty() {
            return Err(PathError::InvalidFilter {
                segment: part.to_string(),
                position,
            });
        }

        Ok(Segment::FilteredKey {
            key: key.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    /// The original expression string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed segments, in evaluation order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Evaluate the expression against a payload.
    ///
    /// Returns `None` when any segment does not match; duplicate filter
    /// matches always take the first occurrence in source order.
    pub fn extract<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match segment {
                Segment::Key(key) => current.get(key.as_str())?,
                Segment::IndexedKey { key, index } => current.get(key.as_str())?.get(*index)?,
                Segment::FilteredKey { key, field, value } => current
                    .get(key.as_str())?
                    .as_array()?
                    .iter()
                    .find(|element| {
                        element
                            .get(field.as_str())
                            .is_some_and(|v| scalar_eq(v, value))
                    })?,
            };
        }
        Some(current)
    }

    /// Evaluate the expression and render the matched value as a string.
    ///
    /// Strings are returned verbatim; numbers and booleans via their
    /// canonical display form. Objects, arrays, and `null` yield `None`
    /// because they have no scalar rendering.
    pub fn extract_scalar(&self, root: &Value) -> Option<String> {
        scalar_to_string(self.extract(root)?)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for PathExpression {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PathExpression {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PathExpression> for String {
    fn from(expr: PathExpression) -> Self {
        expr.raw
    }
}

// ============================================================================
// Scalar helpers
// ============================================================================

/// Render a JSON scalar as a string; non-scalar values have no rendering.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// String comparison between a JSON scalar and a filter value.
fn scalar_eq(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        _ => false,
    }
}

// ============================================================================
// Error types
// ============================================================================

/// Validation errors for path expression syntax.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PathError {
    /// The expression string is empty.
    #[error("path expression is empty")]
    Empty,

    /// A dot-separated segment is empty (`a..b`, leading or trailing dot).
    #[error("path expression has an empty segment at position {position}")]
    EmptySegment { position: usize },

    /// A bracketed filter does not carry a `field=value` form.
    #[error("invalid filter '{segment}' at position {position}: expected name[field=value]")]
    InvalidFilter { segment: String, position: usize },

    /// Brackets are unbalanced or nested.
    #[error("unbalanced brackets in segment '{segment}' at position {position}")]
    UnbalancedBrackets { segment: String, position: usize },
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
