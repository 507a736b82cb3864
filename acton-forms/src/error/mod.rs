//! Error types and error handling
//!
//! The typed [`FormBuilder`](crate::builder::FormBuilder) API cannot be handed a
//! malformed shape, so it never fails. Errors only arise when a form is
//! described by loosely-typed data (JSON or TOML) and interpreted at runtime.

use std::path::PathBuf;

use thiserror::Error;

/// Forms error type
#[derive(Debug, Error)]
pub enum FormError {
    /// A group was requested but the configuration node is not a mapping
    #[error("Expected a mapping of controls at `{path}`, found {found}")]
    NotAMapping {
        /// Location of the offending node
        path: String,
        /// JSON kind that was found instead
        found: &'static str,
    },

    /// An array was requested but the configuration node is not a sequence
    #[error("Expected a sequence of controls at `{path}`, found {found}")]
    NotASequence {
        /// Location of the offending node
        path: String,
        /// JSON kind that was found instead
        found: &'static str,
    },

    /// A `[value, validator?, asyncValidator?]` tuple had no value element
    #[error("Control tuple at `{path}` is empty; expected [value, validator?, asyncValidator?]")]
    EmptyTuple {
        /// Location of the offending node
        path: String,
    },

    /// A control tuple carried more than three elements (strict mode only)
    #[error("Control tuple at `{path}` has {len} elements; at most 3 are allowed")]
    TupleTooLong {
        /// Location of the offending node
        path: String,
        /// Number of elements found
        len: usize,
    },

    /// A validator name was not found in the registry
    #[error("Unknown validator `{name}` at `{path}`")]
    UnknownValidator {
        /// Location of the offending node
        path: String,
        /// Name that failed to resolve
        name: String,
    },

    /// A validator slot held something other than null, a name or a list of names
    #[error("Invalid validator specification at `{path}`: {reason}")]
    InvalidValidatorSpec {
        /// Location of the offending node
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// The extra options of a group were malformed
    #[error("Invalid group options: {0}")]
    InvalidExtra(String),

    /// A schema file does not exist at the given path
    #[error("Form schema not found at `{}`", path.display())]
    SchemaNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// A schema file exists but could not be read
    #[error("Failed to read form schema `{}`: {source}", path.display())]
    SchemaRead {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// Configuration or schema file could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl FormError {
    /// Name of the JSON kind of a value, for error messages
    #[must_use]
    pub const fn kind_of(value: &serde_json::Value) -> &'static str {
        match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "a sequence",
            serde_json::Value::Object(_) => "a mapping",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_of() {
        assert_eq!(FormError::kind_of(&json!(null)), "null");
        assert_eq!(FormError::kind_of(&json!([1])), "a sequence");
        assert_eq!(FormError::kind_of(&json!({"a": 1})), "a mapping");
    }

    #[test]
    fn test_error_messages() {
        let error = FormError::EmptyTuple {
            path: "user.name".into(),
        };
        assert!(error.to_string().contains("user.name"));

        let error = FormError::UnknownValidator {
            path: "email".into(),
            name: "isEmail".into(),
        };
        assert_eq!(error.to_string(), "Unknown validator `isEmail` at `email`");

        let error = FormError::SchemaNotFound {
            path: PathBuf::from("forms/signup.toml"),
        };
        assert_eq!(
            error.to_string(),
            "Form schema not found at `forms/signup.toml`"
        );
    }
}
