//! Stock validators
//!
//! Every function returns a ready-to-use [`ValidatorFn`] or
//! [`AsyncValidatorFn`]. Length and pattern validators pass on empty values so
//! they compose with [`required`] instead of duplicating it.
//!
//! # Examples
//!
//! ```rust
//! use acton_forms::model::{Control, FormControl};
//! use acton_forms::validators;
//!
//! let password = Control::new(
//!     "abc",
//!     Some(validators::compose(vec![
//!         validators::required(),
//!         validators::min_length(8),
//!     ])),
//!     None,
//! );
//!
//! assert!(password.has_error("minlength"));
//! assert!(!password.has_error("required"));
//! ```

use std::sync::Arc;

use futures_util::future::join_all;
use futures_util::FutureExt;
use regex::Regex;
use serde_json::{json, Value};
use validator::ValidateEmail;

use crate::model::{AsyncValidatorFn, FormControl, ValidationErrors, ValidatorFn};

/// Whether a value counts as "not filled in"
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Length of a string (in characters) or array; `None` for other values
fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(text) => Some(text.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Fails with `required` when the value is null, an empty string or an empty array
#[must_use]
pub fn required() -> ValidatorFn {
    Arc::new(|control: &dyn FormControl| {
        is_empty_value(&control.value())
            .then(|| ValidationErrors::single("required", Value::Bool(true)))
    })
}

/// Always passes
#[must_use]
pub fn null_validator() -> ValidatorFn {
    Arc::new(|_: &dyn FormControl| None)
}

/// Fails with `minlength` when the value is shorter than `min`
#[must_use]
pub fn min_length(min: usize) -> ValidatorFn {
    Arc::new(move |control: &dyn FormControl| {
        let value = control.value();
        if is_empty_value(&value) {
            return None;
        }
        let actual = length_of(&value)?;
        (actual < min).then(|| {
            ValidationErrors::single(
                "minlength",
                json!({"requiredLength": min, "actualLength": actual}),
            )
        })
    })
}

/// Fails with `maxlength` when the value is longer than `max`
#[must_use]
pub fn max_length(max: usize) -> ValidatorFn {
    Arc::new(move |control: &dyn FormControl| {
        let actual = length_of(&control.value())?;
        (actual > max).then(|| {
            ValidationErrors::single(
                "maxlength",
                json!({"requiredLength": max, "actualLength": actual}),
            )
        })
    })
}

/// Fails with `pattern` when a string value does not fully match `pattern`
///
/// The pattern is anchored at both ends.
///
/// # Errors
///
/// Returns the regex error if `pattern` does not compile.
pub fn pattern(pattern: &str) -> Result<ValidatorFn, regex::Error> {
    let anchored = format!("^(?:{pattern})$");
    let regex = Regex::new(&anchored)?;
    let required_pattern = format!("^{pattern}$");
    Ok(Arc::new(move |control: &dyn FormControl| {
        let value = control.value();
        let text = value.as_str()?;
        if text.is_empty() || regex.is_match(text) {
            return None;
        }
        Some(ValidationErrors::single(
            "pattern",
            json!({"requiredPattern": required_pattern, "actualValue": text}),
        ))
    }))
}

/// Fails with `email` when a non-empty string is not a valid email address
#[must_use]
pub fn email() -> ValidatorFn {
    Arc::new(|control: &dyn FormControl| {
        let value = control.value();
        let text = value.as_str()?.to_owned();
        if text.is_empty() || text.validate_email() {
            None
        } else {
            Some(ValidationErrors::single("email", Value::Bool(true)))
        }
    })
}

/// Run every validator and merge their errors; `None` when all pass
#[must_use]
pub fn compose(validators: Vec<ValidatorFn>) -> ValidatorFn {
    Arc::new(move |control: &dyn FormControl| {
        validators
            .iter()
            .filter_map(|validator| validator(control))
            .fold(ValidationErrors::new(), |mut merged, errors| {
                merged.merge(errors);
                merged
            })
            .into_option()
    })
}

/// Run every async validator concurrently and merge their errors
#[must_use]
pub fn compose_async(validators: Vec<AsyncValidatorFn>) -> AsyncValidatorFn {
    Arc::new(move |control: &dyn FormControl| {
        let pending: Vec<_> = validators.iter().map(|validator| validator(control)).collect();
        async move {
            join_all(pending)
                .await
                .into_iter()
                .flatten()
                .fold(ValidationErrors::new(), |mut merged, errors| {
                    merged.merge(errors);
                    merged
                })
                .into_option()
        }
        .boxed()
    })
}
