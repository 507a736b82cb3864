//! Named collection of controls

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use futures_util::future::join_all;
use serde_json::Value;

use super::{
    AbstractControl, AsyncValidatorFn, ControlStatus, FormControl, ValidationErrors, ValidatorFn,
};

/// A composite form section: field name to control
///
/// Fields listed in `optionals` with `false` are excluded: they do not
/// contribute to the group's value or validity until [`ControlGroup::include`]
/// is called for them.
#[derive(Clone)]
pub struct ControlGroup {
    controls: BTreeMap<String, AbstractControl>,
    optionals: Option<HashMap<String, bool>>,
    validator: Option<ValidatorFn>,
    async_validator: Option<AsyncValidatorFn>,
    errors: Option<ValidationErrors>,
    pending: bool,
}

impl ControlGroup {
    /// Create a group and run its sync validator
    #[must_use]
    pub fn new(
        controls: BTreeMap<String, AbstractControl>,
        optionals: Option<HashMap<String, bool>>,
        validator: Option<ValidatorFn>,
        async_validator: Option<AsyncValidatorFn>,
    ) -> Self {
        let mut group = Self {
            controls,
            optionals,
            validator,
            async_validator,
            errors: None,
            pending: false,
        };
        group.run_validator();
        group
    }

    /// All controls, included or not
    #[must_use]
    pub const fn controls(&self) -> &BTreeMap<String, AbstractControl> {
        &self.controls
    }

    /// The optionals metadata the group was built with
    #[must_use]
    pub const fn optionals(&self) -> Option<&HashMap<String, bool>> {
        self.optionals.as_ref()
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

    /// Get a control by name, whether included or not
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AbstractControl> {
        self.controls.get(name)
    }

    /// Mutably get a control by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut AbstractControl> {
        self.controls.get_mut(name)
    }

    /// Add a control, replacing any existing one with the same name
    pub fn add_control(&mut self, name: impl Into<String>, control: impl Into<AbstractControl>) {
        self.controls.insert(name.into(), control.into());
        self.run_validator();
    }

    /// Remove a control by name
    pub fn remove_control(&mut self, name: &str) -> Option<AbstractControl> {
        let removed = self.controls.remove(name);
        self.run_validator();
        removed
    }

    /// Whether `name` exists and is currently included
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.controls.contains_key(name) && self.is_included(name)
    }

    /// Mark an optional field as included
    pub fn include(&mut self, name: impl Into<String>) {
        self.set_optional(name.into(), true);
    }

    /// Mark an optional field as excluded
    pub fn exclude(&mut self, name: impl Into<String>) {
        self.set_optional(name.into(), false);
    }

    /// Re-run sync validators over all children, then this group
    ///
    /// Clears a pending state left behind by a cancelled [`validate_async`](Self::validate_async).
    pub fn update_value_and_validity(&mut self) {
        for control in self.controls.values_mut() {
            control.update_value_and_validity();
        }
        self.pending = false;
        self.run_validator();
    }

    /// Run async validators over all children, then this group
    pub async fn validate_async(&mut self) {
        join_all(self.controls.values_mut().map(AbstractControl::validate_async)).await;

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

    fn is_included(&self, name: &str) -> bool {
        self.optionals
            .as_ref()
            .and_then(|optionals| optionals.get(name))
            .copied()
            .unwrap_or(true)
    }

    fn set_optional(&mut self, name: String, included: bool) {
        self.optionals
            .get_or_insert_with(HashMap::new)
            .insert(name, included);
        self.run_validator();
    }

    fn included(&self) -> impl Iterator<Item = (&String, &AbstractControl)> {
        self.controls
            .iter()
            .filter(|(name, _)| self.is_included(name))
    }

    fn run_validator(&mut self) {
        self.errors = self.validator.as_ref().and_then(|validator| validator(&*self));
    }
}

impl FormControl for ControlGroup {
    fn value(&self) -> Value {
        Value::Object(
            self.included()
                .map(|(name, control)| (name.clone(), control.value()))
                .collect(),
        )
    }

    fn status(&self) -> ControlStatus {
        ControlStatus::aggregate(
            self.errors.is_some(),
            self.pending,
            self.included().map(|(_, control)| control.status()),
        )
    }

    fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    fn child(&self, segment: &str) -> Option<&AbstractControl> {
        self.controls.get(segment)
    }
}

impl fmt::Debug for ControlGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlGroup")
            .field("controls", &self.controls)
            .field("optionals", &self.optionals)
            .field("errors", &self.errors)
            .field("has_validator", &self.validator.is_some())
            .field("has_async_validator", &self.async_validator.is_some())
            .finish()
    }
}
