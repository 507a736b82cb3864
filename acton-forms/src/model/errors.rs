//! Validation error collection
//!
//! Validators report failures as a map from error key (`required`,
//! `minlength`, ...) to a JSON detail value. A validator that passes reports
//! `None` rather than an empty collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Collection of validation errors keyed by error code
///
/// # Examples
///
/// ```rust
/// use acton_forms::model::ValidationErrors;
/// use serde_json::json;
///
/// let mut errors = ValidationErrors::new();
/// errors.flag("required");
/// errors.insert("minlength", json!({"requiredLength": 8, "actualLength": 3}));
///
/// assert!(errors.contains("required"));
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Value>,
}

impl ValidationErrors {
    /// Create a new empty error collection
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    /// Create a collection holding a single error
    #[must_use]
    pub fn single(code: impl Into<String>, detail: Value) -> Self {
        let mut errors = Self::new();
        errors.insert(code, detail);
        errors
    }

    /// Add an error with a detail value, replacing any previous detail
    pub fn insert(&mut self, code: impl Into<String>, detail: Value) {
        self.errors.insert(code.into(), detail);
    }

    /// Add an error whose detail is simply `true`
    pub fn flag(&mut self, code: impl Into<String>) {
        self.insert(code, Value::Bool(true));
    }

    /// Check if a specific error code is present
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.errors.contains_key(code)
    }

    /// Get the detail for an error code
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Value> {
        self.errors.get(code)
    }

    /// Check if there are no errors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of error codes present
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Merge errors from another collection; later details win
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    /// Convert into `None` when empty, the shape validators return
    #[must_use]
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Iterate over all errors
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

/// Convert from validator crate's `ValidationErrors`
///
/// Each field error becomes an entry keyed `field.code` whose detail carries
/// the message and the validator's parameters.
impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut result = Self::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let mut detail: serde_json::Map<String, Value> = error
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect();
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                detail.insert("message".to_string(), Value::String(message));
                result.insert(format!("{field}.{}", error.code), Value::Object(detail));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    #[derive(Validate)]
    struct SignUp {
        #[validate(email)]
        email: String,
        #[validate(length(min = 8, message = "too short"))]
        password: String,
    }

    #[test]
    fn test_validation_errors_new() {
        let errors = ValidationErrors::new();
        assert!(errors.is_empty());
        assert_eq!(errors.len(), 0);
        assert!(errors.into_option().is_none());
    }

    #[test]
    fn test_validation_errors_insert() {
        let mut errors = ValidationErrors::new();
        errors.flag("required");
        errors.insert("pattern", json!({"requiredPattern": "^a$"}));

        assert!(errors.contains("required"));
        assert!(!errors.contains("email"));
        assert_eq!(errors.get("required"), Some(&json!(true)));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_validation_errors_merge() {
        let mut first = ValidationErrors::single("required", json!(true));
        let second = ValidationErrors::single("email", json!(true));

        first.merge(second);

        assert!(first.contains("required"));
        assert!(first.contains("email"));
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let errors = ValidationErrors::single("required", json!(true));
        assert_eq!(serde_json::to_value(&errors).unwrap(), json!({"required": true}));
    }

    #[test]
    fn test_from_validator_errors() {
        let form = SignUp {
            email: "not-an-email".into(),
            password: "short".into(),
        };
        let errors: ValidationErrors = form.validate().unwrap_err().into();

        assert!(errors.contains("email.email"));
        let detail = errors.get("password.length").unwrap();
        assert_eq!(detail["message"], json!("too short"));
        assert_eq!(detail["min"], json!(8));
    }
}
