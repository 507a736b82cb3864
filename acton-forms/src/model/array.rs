//! Ordered collection of controls

use std::fmt;

use futures_util::future::join_all;
use serde_json::Value;

use super::{
    AbstractControl, AsyncValidatorFn, ControlStatus, FormControl, ValidationErrors, ValidatorFn,
};

/// A repeatable list of controls; position is the field index
#[derive(Clone)]
pub struct ControlArray {
    controls: Vec<AbstractControl>,
    validator: Option<ValidatorFn>,
    async_validator: Option<AsyncValidatorFn>,
    errors: Option<ValidationErrors>,
    pending: bool,
}

impl ControlArray {
    /// Create an array and run its sync validator
    #[must_use]
    pub fn new(
        controls: Vec<AbstractControl>,
        validator: Option<ValidatorFn>,
        async_validator: Option<AsyncValidatorFn>,
    ) -> Self {
        let mut array = Self {
            controls,
            validator,
            async_validator,
            errors: None,
            pending: false,
        };
        array.run_validator();
        array
    }

    /// All controls in order
    #[must_use]
    pub fn controls(&self) -> &[AbstractControl] {
        &self.controls
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

    /// Control at `index`
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&AbstractControl> {
        self.controls.get(index)
    }

    /// Mutable control at `index`
    pub fn at_mut(&mut self, index: usize) -> Option<&mut AbstractControl> {
        self.controls.get_mut(index)
    }

    /// Append a control
    pub fn push(&mut self, control: impl Into<AbstractControl>) {
        self.controls.push(control.into());
        self.run_validator();
    }

    /// Insert a control at `index`, shifting later controls
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, control: impl Into<AbstractControl>) {
        self.controls.insert(index, control.into());
        self.run_validator();
    }

    /// Remove the control at `index`, if present
    pub fn remove_at(&mut self, index: usize) -> Option<AbstractControl> {
        if index >= self.controls.len() {
            return None;
        }
        let removed = self.controls.remove(index);
        self.run_validator();
        Some(removed)
    }

    /// Number of controls
    #[must_use]
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Whether the array holds no controls
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Re-run sync validators over all children, then this array
    ///
    /// Clears a pending state left behind by a cancelled [`validate_async`](Self::validate_async).
    pub fn update_value_and_validity(&mut self) {
        for control in &mut self.controls {
            control.update_value_and_validity();
        }
        self.pending = false;
        self.run_validator();
    }

    /// Run async validators over all children, then this array
    pub async fn validate_async(&mut self) {
        join_all(self.controls.iter_mut().map(AbstractControl::validate_async)).await;

        if self.status() != ControlStatus::Valid {
            return;
        }
        let Some(validator) = self.async_validator.clone() else {
            return;
        };
        let pending = validator(&*self);
        self.pending = true;
        let errors = pending.await;
        self.pending = false;
        self.errors = errors;
    }

    fn run_validator(&mut self) {
        self.errors = self.validator.as_ref().and_then(|validator| validator(&*self));
    }
}

impl FormControl for ControlArray {
    fn value(&self) -> Value {
        Value::Array(self.controls.iter().map(FormControl::value).collect())
    }

    fn status(&self) -> ControlStatus {
        ControlStatus::aggregate(
            self.errors.is_some(),
            self.pending,
            self.controls.iter().map(FormControl::status),
        )
    }

    fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    fn child(&self, segment: &str) -> Option<&AbstractControl> {
        self.controls.get(segment.parse::<usize>().ok()?)
    }
}

impl fmt::Debug for ControlArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlArray")
            .field("controls", &self.controls)
            .field("errors", &self.errors)
            .field("has_validator", &self.validator.is_some())
            .field("has_async_validator", &self.async_validator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Control;
    use crate::validators;
    use serde_json::json;

    fn leaf(value: &str) -> AbstractControl {
        AbstractControl::from(Control::new(value, None, None))
    }

    #[test]
    fn test_value_preserves_order() {
        let array = ControlArray::new(vec![leaf("a"), leaf("b"), leaf("c")], None, None);
        assert_eq!(array.value(), json!(["a", "b", "c"]));
        assert_eq!(array.len(), 3);
        assert!(!array.is_empty());
    }

    #[test]
    fn test_push_insert_remove() {
        let mut array = ControlArray::new(vec![leaf("a")], None, None);
        array.push(Control::new("c", None, None));
        array.insert(1, Control::new("b", None, None));
        assert_eq!(array.value(), json!(["a", "b", "c"]));

        let removed = array.remove_at(0).unwrap();
        assert_eq!(removed.value(), json!("a"));
        assert!(array.remove_at(5).is_none());
        assert_eq!(array.value(), json!(["b", "c"]));
    }

    #[test]
    fn test_array_validator_tracks_length() {
        let mut array = ControlArray::new(vec![], Some(validators::required()), None);
        assert!(array.has_error("required"));

        array.push(Control::new("x", None, None));
        assert!(array.is_valid());
    }

    #[test]
    fn test_invalid_child_invalidates_array() {
        let array = ControlArray::new(
            vec![
                leaf("ok"),
                AbstractControl::from(Control::new("", Some(validators::required()), None)),
            ],
            None,
            None,
        );
        assert_eq!(array.status(), ControlStatus::Invalid);
        assert!(array.errors().is_none());
        assert!(array.find("1").unwrap().has_error("required"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_async_validation_clears_on_update() {
        use futures_util::FutureExt;
        use std::sync::Arc;
        use std::time::Duration;

        let never_resolves: AsyncValidatorFn = Arc::new(|_: &dyn FormControl| {
            futures_util::future::pending::<Option<ValidationErrors>>().boxed()
        });
        let mut array = ControlArray::new(vec![leaf("a")], None, Some(never_resolves));

        let outcome = tokio::time::timeout(Duration::from_millis(10), array.validate_async()).await;
        assert!(outcome.is_err());
        assert_eq!(array.status(), ControlStatus::Pending);

        array.update_value_and_validity();
        assert_eq!(array.status(), ControlStatus::Valid);
    }
}
