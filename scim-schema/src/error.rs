//! Error types shared by the schema model and the property engine.

use serde_json::Value;
use thiserror::Error;

/// Result type for schema and property operations.
pub type ScimResult<T> = Result<T, ScimError>;

/// Errors that can occur while loading schemas or operating on properties.
#[derive(Debug, Error)]
pub enum ScimError {
    /// A value's shape or kind does not fit the target attribute.
    #[error("value of type {found} is incompatible with attribute '{path}'")]
    InvalidValue { found: &'static str, path: String },

    /// A comparison operator was routed to a property kind that cannot
    /// evaluate it.
    #[error("incompatible operation: '{op}' is not supported by attribute '{path}'")]
    IncompatibleOperation { op: &'static str, path: String },

    /// A schema or metadata document could not be parsed.
    #[error("invalid schema definition: {0}")]
    Schema(#[from] serde_json::Error),
}

impl ScimError {
    /// Builds an [`ScimError::InvalidValue`] for `value` targeted at `path`.
    pub fn invalid_value(value: &Value, path: impl Into<String>) -> Self {
        Self::InvalidValue {
            found: value_kind(value),
            path: path.into(),
        }
    }

    /// Builds an [`ScimError::IncompatibleOperation`].
    pub fn incompatible_op(op: &'static str, path: impl Into<String>) -> Self {
        Self::IncompatibleOperation {
            op,
            path: path.into(),
        }
    }

    /// Returns true for [`ScimError::InvalidValue`].
    #[must_use]
    pub fn is_invalid_value(&self) -> bool {
        matches!(self, Self::InvalidValue { .. })
    }

    /// Returns true for [`ScimError::IncompatibleOperation`].
    #[must_use]
    pub fn is_incompatible_op(&self) -> bool {
        matches!(self, Self::IncompatibleOperation { .. })
    }
}

/// Name of the JSON kind of `value`, as reported in diagnostics.
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
