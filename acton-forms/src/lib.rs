//! acton-forms: form control trees for HTMX applications
//!
//! Builds trees of form controls (fields, groups and arrays) from a nested
//! description, validates them with sync and async validators, and can read
//! form descriptions from JSON or TOML.
//!
//! # Quick Start
//!
//! ```rust
//! use acton_forms::prelude::*;
//!
//! let fb = FormBuilder::new();
//!
//! let mut form = AbstractControl::from(fb.group(
//!     [
//!         ("email", ControlConfig::from(("", validators::email()))),
//!         ("password", ControlConfig::from(("", validators::required()))),
//!         (
//!             "phones",
//!             fb.array([ControlConfig::from("555-1234")], None, None).into(),
//!         ),
//!     ],
//!     None,
//! ));
//!
//! assert!(!form.is_valid());
//!
//! if let Some(AbstractControl::Control(password)) = form.find_mut("password") {
//!     password.set_value("hunter22");
//! }
//! form.update_value_and_validity();
//! assert!(form.is_valid());
//! ```
//!
//! # Modules
//!
//! - [`builder`] - [`FormBuilder`](builder::FormBuilder) and configuration nodes
//! - [`model`] - `Control`, `ControlGroup`, `ControlArray`
//! - [`validators`] - stock validators
//! - [`schema`] - forms described as JSON or TOML
//! - [`config`] - settings loaded with figment
//! - [`observability`] - tracing subscriber setup

#![allow(clippy::missing_errors_doc)]

pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod observability;
pub mod schema;
pub mod validators;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use acton_forms::prelude::*;
    //! ```

    // Builder
    pub use crate::builder::{ControlConfig, FormBuilder, GroupExtra};

    // Model
    pub use crate::model::{
        AbstractControl, AsyncValidatorFn, Control, ControlArray, ControlGroup, ControlStatus,
        FormControl, ValidationErrors, ValidatorFn,
    };

    // Validators
    pub use crate::validators;

    // Dynamic descriptions
    pub use crate::schema::{FormSchema, SchemaInterpreter, ValidatorRegistry};

    // Configuration and errors
    pub use crate::config::FormsConfig;
    pub use crate::error::FormError;

    // Convenience for JSON values
    pub use serde_json::json;
}
