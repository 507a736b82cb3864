//! Form control model
//!
//! Three kinds of control make up a form tree:
//!
//! - [`Control`] - a leaf field holding a value
//! - [`ControlGroup`] - named sub-controls forming a composite section
//! - [`ControlArray`] - ordered sub-controls forming a repeatable list
//!
//! All three implement [`FormControl`], the capability set validators are
//! written against, and all three can be held as an [`AbstractControl`].
//!
//! # Validation
//!
//! Sync validators run on [`AbstractControl::update_value_and_validity`],
//! children before parents. Async validators run on
//! [`AbstractControl::validate_async`] and only for controls that are valid
//! after sync validation.
//!
//! ```rust
//! use acton_forms::model::{AbstractControl, Control, ControlGroup, FormControl};
//! use acton_forms::validators;
//!
//! let name = Control::new("", Some(validators::required()), None);
//! let mut form = AbstractControl::from(ControlGroup::new(
//!     [("name".to_string(), AbstractControl::from(name))].into_iter().collect(),
//!     None,
//!     None,
//!     None,
//! ));
//!
//! form.update_value_and_validity();
//! assert!(!form.is_valid());
//! assert!(form.find("name").unwrap().has_error("required"));
//! ```

mod array;
mod control;
mod errors;
mod group;

use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

pub use array::ControlArray;
pub use control::Control;
pub use errors::ValidationErrors;
pub use group::ControlGroup;

/// Synchronous validator: inspects a control and reports errors or `None`
pub type ValidatorFn = Arc<dyn Fn(&dyn FormControl) -> Option<ValidationErrors> + Send + Sync>;

/// Asynchronous validator: inspects a control and resolves to errors or `None`
///
/// The returned future must own everything it needs; copy the value out of
/// the control before building it.
pub type AsyncValidatorFn =
    Arc<dyn Fn(&dyn FormControl) -> BoxFuture<'static, Option<ValidationErrors>> + Send + Sync>;

/// Validation status of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlStatus {
    /// All validators passed
    #[default]
    Valid,
    /// At least one validator reported errors
    Invalid,
    /// An async validator has not resolved yet
    Pending,
}

impl ControlStatus {
    /// Get the conventional upper-case status name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::Invalid => "INVALID",
            Self::Pending => "PENDING",
        }
    }

    /// Status of a composite from its own errors and its children's statuses
    ///
    /// Own errors win, then any pending child, then any invalid child.
    pub(crate) fn aggregate<I>(own_errors: bool, own_pending: bool, children: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        if own_errors {
            return Self::Invalid;
        }
        let mut invalid = false;
        for status in children {
            match status {
                Self::Pending => return Self::Pending,
                Self::Invalid => invalid = true,
                Self::Valid => {}
            }
        }
        if invalid {
            Self::Invalid
        } else if own_pending {
            Self::Pending
        } else {
            Self::Valid
        }
    }
}

impl std::fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capability set shared by every kind of control
pub trait FormControl: Send + Sync {
    /// Current value (aggregated for groups and arrays)
    fn value(&self) -> Value;

    /// Current validation status
    fn status(&self) -> ControlStatus;

    /// Errors reported by this control's own validators
    fn errors(&self) -> Option<&ValidationErrors>;

    /// Direct child by name (groups) or index (arrays)
    fn child(&self, _segment: &str) -> Option<&AbstractControl> {
        None
    }

    /// Whether the control is valid
    fn is_valid(&self) -> bool {
        self.status() == ControlStatus::Valid
    }

    /// Whether an async validator is still running
    fn is_pending(&self) -> bool {
        self.status() == ControlStatus::Pending
    }

    /// Whether this control's own errors contain `code`
    fn has_error(&self, code: &str) -> bool {
        self.errors().is_some_and(|errors| errors.contains(code))
    }

    /// Look up a descendant by dotted path, e.g. `address.street` or `phones.0`
    fn find(&self, path: &str) -> Option<&AbstractControl> {
        let mut segments = path.split('.');
        let mut current = self.child(segments.next()?)?;
        for segment in segments {
            current = current.child(segment)?;
        }
        Some(current)
    }
}

/// Any control in a form tree
#[derive(Debug, Clone)]
pub enum AbstractControl {
    /// Leaf field
    Control(Control),
    /// Named collection of controls
    Group(ControlGroup),
    /// Ordered collection of controls
    Array(ControlArray),
}

impl AbstractControl {
    /// Borrow as a leaf control
    #[must_use]
    pub const fn as_control(&self) -> Option<&Control> {
        match self {
            Self::Control(control) => Some(control),
            _ => None,
        }
    }

    /// Borrow as a group
    #[must_use]
    pub const fn as_group(&self) -> Option<&ControlGroup> {
        match self {
            Self::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Borrow as an array
    #[must_use]
    pub const fn as_array(&self) -> Option<&ControlArray> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Mutably borrow a descendant by dotted path
    pub fn find_mut(&mut self, path: &str) -> Option<&mut Self> {
        let mut current = self;
        for segment in path.split('.') {
            current = match current {
                Self::Control(_) => return None,
                Self::Group(group) => group.get_mut(segment)?,
                Self::Array(array) => array.at_mut(segment.parse().ok()?)?,
            };
        }
        Some(current)
    }

    /// Re-run sync validators over the whole subtree
    pub fn update_value_and_validity(&mut self) {
        match self {
            Self::Control(control) => control.update_value_and_validity(),
            Self::Group(group) => group.update_value_and_validity(),
            Self::Array(array) => array.update_value_and_validity(),
        }
    }

    /// Run async validators over the whole subtree
    pub fn validate_async(&mut self) -> BoxFuture<'_, ()> {
        match self {
            Self::Control(control) => Box::pin(control.validate_async()),
            Self::Group(group) => Box::pin(group.validate_async()),
            Self::Array(array) => Box::pin(array.validate_async()),
        }
    }

    fn inner(&self) -> &dyn FormControl {
        match self {
            Self::Control(control) => control,
            Self::Group(group) => group,
            Self::Array(array) => array,
        }
    }
}

impl FormControl for AbstractControl {
    fn value(&self) -> Value {
        self.inner().value()
    }

    fn status(&self) -> ControlStatus {
        self.inner().status()
    }

    fn errors(&self) -> Option<&ValidationErrors> {
        self.inner().errors()
    }

    fn child(&self, segment: &str) -> Option<&AbstractControl> {
        self.inner().child(segment)
    }
}

impl From<Control> for AbstractControl {
    fn from(control: Control) -> Self {
        Self::Control(control)
    }
}

impl From<ControlGroup> for AbstractControl {
    fn from(group: ControlGroup) -> Self {
        Self::Group(group)
    }
}

impl From<ControlArray> for AbstractControl {
    fn from(array: ControlArray) -> Self {
        Self::Array(array)
    }
}
