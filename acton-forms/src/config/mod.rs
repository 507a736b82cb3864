//! Configuration management for acton-forms
//!
//! Settings are loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `ACTON_FORMS_` prefix)
//! 2. `./forms.toml`
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # forms.toml
//! strict_tuples = true
//! schema_dir = "./config/forms"
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use acton_forms::config::FormsConfig;
//!
//! # fn example() -> Result<(), acton_forms::error::FormError> {
//! let config = FormsConfig::load()?;
//! let strict = config.strict_tuples;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// Default settings file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "forms.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ACTON_FORMS_";

/// Settings for interpreting loosely-typed form descriptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Reject control tuples with more than three elements instead of
    /// ignoring the extra elements
    pub strict_tuples: bool,

    /// Directory holding form schema files
    pub schema_dir: PathBuf,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            strict_tuples: false,
            schema_dir: PathBuf::from("./forms"),
        }
    }
}

impl FormsConfig {
    /// Load settings from `./forms.toml` and the environment
    pub fn load() -> Result<Self, FormError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from a specific file and the environment
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading forms configuration");
        Self::figment(path).extract().map_err(|e| FormError::Config(Box::new(e)))
    }

    /// The layered figment used by [`FormsConfig::load_from`]
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Path of a named schema inside [`FormsConfig::schema_dir`]
    ///
    /// Prefers `<name>.toml`, falling back to `<name>.json` when only that
    /// exists.
    #[must_use]
    pub fn schema_path(&self, name: &str) -> PathBuf {
        let toml = self.schema_dir.join(format!("{name}.toml"));
        if toml.exists() {
            return toml;
        }
        let json = self.schema_dir.join(format!("{name}.json"));
        if json.exists() {
            json
        } else {
            toml
        }
    }
}
