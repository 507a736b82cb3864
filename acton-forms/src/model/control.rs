//! Leaf form control

use std::fmt;

use futures_util::future::BoxFuture;
use serde_json::Value;

use super::{AsyncValidatorFn, ControlStatus, FormControl, ValidationErrors, ValidatorFn};

/// A single form field holding a value and optional validators
#[derive(Clone)]
pub struct Control {
    value: Value,
    validator: Option<ValidatorFn>,
    async_validator: Option<AsyncValidatorFn>,
    errors: Option<ValidationErrors>,
    status: ControlStatus,
}

impl Control {
    /// Create a control and run its sync validator against the initial value
    #[must_use]
    pub fn new(
        value: impl Into<Value>,
        validator: Option<ValidatorFn>,
        async_validator: Option<AsyncValidatorFn>,
    ) -> Self {
        let mut control = Self {
            value: value.into(),
            validator,
            async_validator,
            errors: None,
            status: ControlStatus::Valid,
        };
        control.update_value_and_validity();
        control
    }

    /// Borrow the current value
    #[must_use]
    pub const fn value_ref(&self) -> &Value {
        &self.value
    }

    /// Replace the value and re-run sync validation
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
        self.update_value_and_validity();
    }

    /// The sync validator, if any
    #[must_use]
    pub const fn validator(&self) -> Option<&ValidatorFn> {
        self.validator.as_ref()
    }

    /// The async validator, if any
    #[must_use]
    pub const fn async_validator(&self) -> Option<&AsyncValidatorFn> {
        self.async_validator.as_ref()
    }

    /// Run the sync validator and recompute the status
    pub fn update_value_and_validity(&mut self) {
        self.errors = self.validator.as_ref().and_then(|validator| validator(&*self));
        self.status = if self.errors.is_some() {
            ControlStatus::Invalid
        } else {
            ControlStatus::Valid
        };
    }

    /// Start async validation, marking the control pending
    ///
    /// Returns `None` when there is no async validator or the control already
    /// failed sync validation. Feed the resolved result to
    /// [`Control::finish_async_validation`].
    pub fn start_async_validation(&mut self) -> Option<BoxFuture<'static, Option<ValidationErrors>>> {
        if self.status == ControlStatus::Invalid {
            return None;
        }
        let validator = self.async_validator.clone()?;
        let pending = validator(&*self);
        self.status = ControlStatus::Pending;
        Some(pending)
    }

    /// Record the result of async validation
    pub fn finish_async_validation(&mut self, errors: Option<ValidationErrors>) {
        self.status = if errors.is_some() {
            ControlStatus::Invalid
        } else {
            ControlStatus::Valid
        };
        self.errors = errors;
    }

    /// Run the async validator to completion
    pub async fn validate_async(&mut self) {
        if let Some(pending) = self.start_async_validation() {
            let errors = pending.await;
            tracing::trace!(
                error_count = errors.as_ref().map_or(0, ValidationErrors::len),
                "async validation finished"
            );
            self.finish_async_validation(errors);
        }
    }
}

impl FormControl for Control {
    fn value(&self) -> Value {
        self.value.clone()
    }

    fn status(&self) -> ControlStatus {
        self.status
    }

    fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("value", &self.value)
            .field("status", &self.status)
            .field("errors", &self.errors)
            .field("has_validator", &self.validator.is_some())
            .field("has_async_validator", &self.async_validator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators;
    use futures_util::FutureExt;
    use serde_json::json;
    use std::sync::Arc;

    fn taken_names() -> AsyncValidatorFn {
        Arc::new(|control: &dyn FormControl| {
            let value = control.value();
            async move {
                (value == json!("admin"))
                    .then(|| ValidationErrors::single("taken", json!(true)))
            }
            .boxed()
        })
    }

    #[test]
    fn test_new_control_without_validators() {
        let control = Control::new("hello", None, None);
        assert_eq!(control.value(), json!("hello"));
        assert!(control.validator().is_none());
        assert!(control.async_validator().is_none());
        assert!(control.is_valid());
        assert!(control.errors().is_none());
    }

    #[test]
    fn test_new_control_runs_sync_validator() {
        let control = Control::new("", Some(validators::required()), None);
        assert_eq!(control.status(), ControlStatus::Invalid);
        assert!(control.has_error("required"));
    }

    #[test]
    fn test_set_value_revalidates() {
        let mut control = Control::new("", Some(validators::required()), None);
        control.set_value("filled");
        assert!(control.is_valid());
        assert_eq!(control.value_ref(), &json!("filled"));
    }

    #[test]
    fn test_control_has_no_children() {
        let control = Control::new(json!({"nested": 1}), None, None);
        assert!(control.find("nested").is_none());
    }

    #[test]
    fn test_start_async_validation_marks_pending() {
        let mut control = Control::new("admin", None, Some(taken_names()));
        let pending = control.start_async_validation();
        assert!(pending.is_some());
        assert!(control.is_pending());
    }

    #[tokio::test]
    async fn test_validate_async_reports_errors() {
        let mut control = Control::new("admin", None, Some(taken_names()));
        control.validate_async().await;
        assert_eq!(control.status(), ControlStatus::Invalid);
        assert!(control.has_error("taken"));

        control.set_value("someone");
        control.validate_async().await;
        assert!(control.is_valid());
    }

    #[tokio::test]
    async fn test_async_skipped_when_sync_invalid() {
        let mut control = Control::new("", Some(validators::required()), Some(taken_names()));
        assert!(control.start_async_validation().is_none());
        control.validate_async().await;
        assert!(control.has_error("required"));
    }
}
