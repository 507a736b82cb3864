//! Configuration nodes accepted by the form builder

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::model::{
    AbstractControl, AsyncValidatorFn, Control, ControlArray, ControlGroup, ValidatorFn,
};

/// Description of one field before it is turned into a control
///
/// Most callers never name the variants: anything convertible into a
/// [`Value`] becomes [`ControlConfig::Value`], any control becomes
/// [`ControlConfig::Existing`], and `(value, validator)` or
/// `(value, validator, async_validator)` tuples become [`ControlConfig::Tuple`].
pub enum ControlConfig {
    /// Already-built control, used as is
    Existing(AbstractControl),
    /// `[value, validator?, async_validator?]`
    Tuple {
        /// Initial value
        value: Value,
        /// Sync validator
        validator: Option<ValidatorFn>,
        /// Async validator
        async_validator: Option<AsyncValidatorFn>,
    },
    /// Bare initial value, no validators
    Value(Value),
}

impl ControlConfig {
    /// Tuple node with explicit, possibly absent, validators
    #[must_use]
    pub fn tuple(
        value: impl Into<Value>,
        validator: Option<ValidatorFn>,
        async_validator: Option<AsyncValidatorFn>,
    ) -> Self {
        Self::Tuple {
            value: value.into(),
            validator,
            async_validator,
        }
    }

    /// Single-element tuple `[value]`
    #[must_use]
    pub fn single(value: impl Into<Value>) -> Self {
        Self::tuple(value, None, None)
    }

    /// Short name of the node's shape, for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Existing(AbstractControl::Control(_)) => "control",
            Self::Existing(AbstractControl::Group(_)) => "group",
            Self::Existing(AbstractControl::Array(_)) => "array",
            Self::Tuple { .. } => "tuple",
            Self::Value(_) => "value",
        }
    }
}

impl fmt::Debug for ControlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing(control) => f.debug_tuple("Existing").field(control).finish(),
            Self::Tuple {
                value,
                validator,
                async_validator,
            } => f
                .debug_struct("Tuple")
                .field("value", value)
                .field("has_validator", &validator.is_some())
                .field("has_async_validator", &async_validator.is_some())
                .finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl From<AbstractControl> for ControlConfig {
    fn from(control: AbstractControl) -> Self {
        Self::Existing(control)
    }
}

impl From<Control> for ControlConfig {
    fn from(control: Control) -> Self {
        Self::Existing(control.into())
    }
}

impl From<ControlGroup> for ControlConfig {
    fn from(group: ControlGroup) -> Self {
        Self::Existing(group.into())
    }
}

impl From<ControlArray> for ControlConfig {
    fn from(array: ControlArray) -> Self {
        Self::Existing(array.into())
    }
}

macro_rules! value_config_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ControlConfig {
                fn from(value: $ty) -> Self {
                    Self::Value(value.into())
                }
            }
        )*
    };
}

value_config_from!(Value, &str, String, bool, i32, i64, u32, u64, f64);

impl<V: Into<Value>> From<(V, ValidatorFn)> for ControlConfig {
    fn from((value, validator): (V, ValidatorFn)) -> Self {
        Self::tuple(value, Some(validator), None)
    }
}

impl<V: Into<Value>> From<(V, ValidatorFn, AsyncValidatorFn)> for ControlConfig {
    fn from((value, validator, async_validator): (V, ValidatorFn, AsyncValidatorFn)) -> Self {
        Self::tuple(value, Some(validator), Some(async_validator))
    }
}

/// Extra options for [`FormBuilder::group`](super::FormBuilder::group)
///
/// Every field defaults to none.
#[derive(Clone, Default)]
pub struct GroupExtra {
    /// Field name to inclusion flag; `false` excludes the field
    pub optionals: Option<HashMap<String, bool>>,
    /// Sync validator for the whole group
    pub validator: Option<ValidatorFn>,
    /// Async validator for the whole group
    pub async_validator: Option<AsyncValidatorFn>,
}

impl GroupExtra {
    /// Create empty extras
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the optionals map
    #[must_use]
    pub fn optionals<K, I>(mut self, optionals: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, bool)>,
    {
        self.optionals = Some(
            optionals
                .into_iter()
                .map(|(name, included)| (name.into(), included))
                .collect(),
        );
        self
    }

    /// Set the group's sync validator
    #[must_use]
    pub fn validator(mut self, validator: ValidatorFn) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Set the group's async validator
    #[must_use]
    pub fn async_validator(mut self, async_validator: AsyncValidatorFn) -> Self {
        self.async_validator = Some(async_validator);
        self
    }
}

impl fmt::Debug for GroupExtra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupExtra")
            .field("optionals", &self.optionals)
            .field("has_validator", &self.validator.is_some())
            .field("has_async_validator", &self.async_validator.is_some())
            .finish()
    }
}
