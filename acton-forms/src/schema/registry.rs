//! Named validators for loosely-typed form descriptions

use std::collections::HashMap;
use std::fmt;

use crate::model::{AsyncValidatorFn, ValidatorFn};
use crate::validators;

/// Lookup table from validator name to validator
///
/// [`ValidatorRegistry::default`] knows `required`, `email` and
/// `nullValidator`. Parameterised names are parsed on lookup:
/// `minLength:N`, `maxLength:N` and `pattern:REGEX`.
#[derive(Clone)]
pub struct ValidatorRegistry {
    sync: HashMap<String, ValidatorFn>,
    async_: HashMap<String, AsyncValidatorFn>,
}

impl ValidatorRegistry {
    /// Create a registry with no validators at all
    #[must_use]
    pub fn empty() -> Self {
        Self {
            sync: HashMap::new(),
            async_: HashMap::new(),
        }
    }

    /// Register a sync validator under `name`
    pub fn register(&mut self, name: impl Into<String>, validator: ValidatorFn) -> &mut Self {
        self.sync.insert(name.into(), validator);
        self
    }

    /// Register an async validator under `name`
    pub fn register_async(
        &mut self,
        name: impl Into<String>,
        validator: AsyncValidatorFn,
    ) -> &mut Self {
        self.async_.insert(name.into(), validator);
        self
    }

    /// Resolve a sync validator by name
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ValidatorFn> {
        if let Some(validator) = self.sync.get(name) {
            return Some(validator.clone());
        }
        let (base, argument) = name.split_once(':')?;
        match base {
            "minLength" => argument.trim().parse().ok().map(validators::min_length),
            "maxLength" => argument.trim().parse().ok().map(validators::max_length),
            "pattern" => validators::pattern(argument).ok(),
            _ => None,
        }
    }

    /// Resolve an async validator by name
    #[must_use]
    pub fn resolve_async(&self, name: &str) -> Option<AsyncValidatorFn> {
        self.async_.get(name).cloned()
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("required", validators::required())
            .register("email", validators::email())
            .register("nullValidator", validators::null_validator());
        registry
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sync: Vec<&str> = self.sync.keys().map(String::as_str).collect();
        sync.sort_unstable();
        let mut async_: Vec<&str> = self.async_.keys().map(String::as_str).collect();
        async_.sort_unstable();
        f.debug_struct("ValidatorRegistry")
            .field("sync", &sync)
            .field("async", &async_)
            .finish()
    }
}
