//! Form builder
//!
//! [`FormBuilder`] turns a nested description of fields into a tree of
//! [`Control`], [`ControlGroup`] and [`ControlArray`] objects. A field may be
//! written three ways, at any depth:
//!
//! - a bare value: `"Ada"`
//! - a tuple: `("Ada", validator)` or [`ControlConfig::tuple`]
//! - an already-built control, group or array, used unchanged
//!
//! # Examples
//!
//! ```rust
//! use acton_forms::builder::{ControlConfig, FormBuilder, GroupExtra};
//! use acton_forms::model::FormControl;
//! use acton_forms::validators;
//!
//! let fb = FormBuilder::new();
//!
//! let form = fb.group(
//!     [
//!         ("name", ControlConfig::from(("", validators::required()))),
//!         ("nickname", ControlConfig::from("")),
//!         (
//!             "address",
//!             fb.group(
//!                 [
//!                     ("street", ControlConfig::single("Main St")),
//!                     ("city", ControlConfig::from("Springfield")),
//!                 ],
//!                 None,
//!             )
//!             .into(),
//!         ),
//!     ],
//!     Some(GroupExtra::new().optionals([("nickname", false)])),
//! );
//!
//! assert!(!form.is_valid());
//! assert_eq!(form.find("address.city").unwrap().value(), "Springfield");
//! assert!(!form.contains("nickname"));
//! ```

mod node;

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, trace};

use crate::model::{
    AbstractControl, AsyncValidatorFn, Control, ControlArray, ControlGroup, ValidatorFn,
};

pub use node::{ControlConfig, GroupExtra};

/// Stateless factory for form control trees
///
/// Holds nothing; one instance can be shared freely or a new one created per
/// use.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormBuilder;

impl FormBuilder {
    /// Create a form builder
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Build a leaf control
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn control(
        &self,
        value: impl Into<Value>,
        validator: Option<ValidatorFn>,
        async_validator: Option<AsyncValidatorFn>,
    ) -> Control {
        Control::new(value, validator, async_validator)
    }

    /// Build a group from field name to configuration node
    ///
    /// `extra` supplies the group's optionals and validators; `None` means
    /// none of them.
    #[must_use]
    pub fn group<K, I>(&self, controls_config: I, extra: Option<GroupExtra>) -> ControlGroup
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ControlConfig)>,
    {
        let controls = self.reduce_controls(controls_config);
        let GroupExtra {
            optionals,
            validator,
            async_validator,
        } = extra.unwrap_or_default();
        debug!(
            fields = controls.len(),
            has_optionals = optionals.is_some(),
            "building control group"
        );
        ControlGroup::new(controls, optionals, validator, async_validator)
    }

    /// Build an array from an ordered sequence of configuration nodes
    #[must_use]
    pub fn array<I>(
        &self,
        controls_config: I,
        validator: Option<ValidatorFn>,
        async_validator: Option<AsyncValidatorFn>,
    ) -> ControlArray
    where
        I: IntoIterator<Item = ControlConfig>,
    {
        let controls: Vec<AbstractControl> = controls_config
            .into_iter()
            .enumerate()
            .map(|(index, node)| {
                trace!(index, kind = node.kind(), "resolving array element");
                self.create_control(node)
            })
            .collect();
        debug!(len = controls.len(), "building control array");
        ControlArray::new(controls, validator, async_validator)
    }

    fn reduce_controls<K, I>(&self, controls_config: I) -> BTreeMap<String, AbstractControl>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ControlConfig)>,
    {
        controls_config
            .into_iter()
            .map(|(name, node)| {
                let name = name.into();
                trace!(field = %name, kind = node.kind(), "resolving group field");
                (name, self.create_control(node))
            })
            .collect()
    }

    pub(crate) fn create_control(&self, node: ControlConfig) -> AbstractControl {
        match node {
            ControlConfig::Existing(control) => control,
            ControlConfig::Tuple {
                value,
                validator,
                async_validator,
            } => self.control(value, validator, async_validator).into(),
            ControlConfig::Value(value) => self.control(value, None, None).into(),
        }
    }
}
