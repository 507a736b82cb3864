//! Loosely-typed form descriptions
//!
//! Forms can be described as data (JSON or TOML) instead of code. The shape
//! mirrors the typed builder:
//!
//! - a JSON array is a control tuple `[value, validator?, asyncValidator?]`
//! - anything else, objects included, is a control's initial value
//! - validator slots hold `null` (or `""`), a registered name, or a list of
//!   names that are composed together
//!
//! Group extras are an object with optional `optionals`, `validator` and
//! `asyncValidator` keys.
//!
//! # Examples
//!
//! ```rust
//! use acton_forms::config::FormsConfig;
//! use acton_forms::model::FormControl;
//! use acton_forms::schema::{SchemaInterpreter, ValidatorRegistry};
//! use serde_json::json;
//!
//! let registry = ValidatorRegistry::default();
//! let interpreter = SchemaInterpreter::new(&registry, &FormsConfig::default());
//!
//! let form = interpreter
//!     .group(
//!         &json!({
//!             "email": ["", ["required", "email"]],
//!             "nickname": "",
//!         }),
//!         Some(&json!({"optionals": {"nickname": false}})),
//!     )
//!     .unwrap();
//!
//! assert!(form.find("email").unwrap().has_error("required"));
//! assert!(!form.contains("nickname"));
//! ```

mod registry;

use std::collections::HashMap;
use std::path::Path;

use figment::providers::{Format, Json, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::builder::{ControlConfig, FormBuilder, GroupExtra};
use crate::config::FormsConfig;
use crate::error::FormError;
use crate::model::{AsyncValidatorFn, ControlArray, ControlGroup, ValidatorFn};
use crate::validators;

pub use registry::ValidatorRegistry;

const ROOT: &str = "$";

fn child_path(parent: &str, segment: impl std::fmt::Display) -> String {
    format!("{parent}.{segment}")
}

/// Interprets JSON values as form descriptions
///
/// Nothing is built unless the whole description is well formed.
#[derive(Debug, Clone, Copy)]
pub struct SchemaInterpreter<'a> {
    builder: FormBuilder,
    registry: &'a ValidatorRegistry,
    strict_tuples: bool,
}

impl<'a> SchemaInterpreter<'a> {
    /// Create an interpreter resolving validator names through `registry`
    #[must_use]
    pub const fn new(registry: &'a ValidatorRegistry, config: &FormsConfig) -> Self {
        Self {
            builder: FormBuilder::new(),
            registry,
            strict_tuples: config.strict_tuples,
        }
    }

    /// Build a group from a mapping of field name to node
    pub fn group(
        &self,
        controls_config: &Value,
        extra: Option<&Value>,
    ) -> Result<ControlGroup, FormError> {
        let Value::Object(fields) = controls_config else {
            return Err(FormError::NotAMapping {
                path: ROOT.to_string(),
                found: FormError::kind_of(controls_config),
            });
        };
        let nodes = fields
            .iter()
            .map(|(name, node)| {
                self.node(node, &child_path(ROOT, name))
                    .map(|node| (name.clone(), node))
            })
            .collect::<Result<Vec<_>, FormError>>()?;
        let extra = extra.map(|extra| self.extra(extra)).transpose()?;
        debug!(fields = nodes.len(), "interpreted group description");
        Ok(self.builder.group(nodes, extra))
    }

    /// Build an array from a sequence of nodes
    pub fn array(
        &self,
        controls_config: &Value,
        validator: Option<&Value>,
        async_validator: Option<&Value>,
    ) -> Result<ControlArray, FormError> {
        let Value::Array(items) = controls_config else {
            return Err(FormError::NotASequence {
                path: ROOT.to_string(),
                found: FormError::kind_of(controls_config),
            });
        };
        let nodes = items
            .iter()
            .enumerate()
            .map(|(index, node)| self.node(node, &child_path(ROOT, index)))
            .collect::<Result<Vec<_>, FormError>>()?;
        let validator = match validator {
            Some(spec) => self.sync_validator(spec, ROOT)?,
            None => None,
        };
        let async_validator = match async_validator {
            Some(spec) => self.async_validator(spec, ROOT)?,
            None => None,
        };
        debug!(len = nodes.len(), "interpreted array description");
        Ok(self.builder.array(nodes, validator, async_validator))
    }

    fn node(&self, node: &Value, path: &str) -> Result<ControlConfig, FormError> {
        let Value::Array(elements) = node else {
            return Ok(ControlConfig::Value(node.clone()));
        };
        let (value, rest) = elements.split_first().ok_or_else(|| FormError::EmptyTuple {
            path: path.to_string(),
        })?;
        if rest.len() > 2 {
            if self.strict_tuples {
                return Err(FormError::TupleTooLong {
                    path: path.to_string(),
                    len: elements.len(),
                });
            }
            warn!(path, len = elements.len(), "ignoring extra control tuple elements");
        }
        let validator = match rest.first() {
            Some(spec) => self.sync_validator(spec, path)?,
            None => None,
        };
        let async_validator = match rest.get(1) {
            Some(spec) => self.async_validator(spec, path)?,
            None => None,
        };
        Ok(ControlConfig::tuple(value.clone(), validator, async_validator))
    }

    fn sync_validator(&self, spec: &Value, path: &str) -> Result<Option<ValidatorFn>, FormError> {
        let names = validator_names(spec, path)?;
        let mut resolved = names
            .into_iter()
            .map(|name| {
                self.registry
                    .resolve(name)
                    .ok_or_else(|| FormError::UnknownValidator {
                        path: path.to_string(),
                        name: name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, FormError>>()?;
        Ok(match resolved.len() {
            0 => None,
            1 => resolved.pop(),
            _ => Some(validators::compose(resolved)),
        })
    }

    fn async_validator(
        &self,
        spec: &Value,
        path: &str,
    ) -> Result<Option<AsyncValidatorFn>, FormError> {
        let names = validator_names(spec, path)?;
        let mut resolved = names
            .into_iter()
            .map(|name| {
                self.registry
                    .resolve_async(name)
                    .ok_or_else(|| FormError::UnknownValidator {
                        path: path.to_string(),
                        name: name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, FormError>>()?;
        Ok(match resolved.len() {
            0 => None,
            1 => resolved.pop(),
            _ => Some(validators::compose_async(resolved)),
        })
    }

    fn extra(&self, extra: &Value) -> Result<GroupExtra, FormError> {
        let fields = match extra {
            Value::Null => return Ok(GroupExtra::default()),
            Value::Object(fields) => fields,
            other => {
                return Err(FormError::InvalidExtra(format!(
                    "expected a mapping, found {}",
                    FormError::kind_of(other)
                )))
            }
        };

        let mut result = GroupExtra::default();
        for (key, value) in fields {
            match key.as_str() {
                "optionals" => result.optionals = optionals(value)?,
                "validator" => result.validator = self.sync_validator(value, ROOT)?,
                "asyncValidator" => result.async_validator = self.async_validator(value, ROOT)?,
                other => warn!(key = other, "ignoring unknown group option"),
            }
        }
        Ok(result)
    }
}

fn validator_names<'v>(spec: &'v Value, path: &str) -> Result<Vec<&'v str>, FormError> {
    match spec {
        Value::Null => Ok(Vec::new()),
        Value::String(name) if name.is_empty() => Ok(Vec::new()),
        Value::String(name) => Ok(vec![name.as_str()]),
        Value::Array(names) => names
            .iter()
            .map(|name| {
                name.as_str().ok_or_else(|| FormError::InvalidValidatorSpec {
                    path: path.to_string(),
                    reason: format!("list entries must be names, found {}", FormError::kind_of(name)),
                })
            })
            .collect(),
        other => Err(FormError::InvalidValidatorSpec {
            path: path.to_string(),
            reason: format!(
                "expected null, a name or a list of names, found {}",
                FormError::kind_of(other)
            ),
        }),
    }
}

fn optionals(value: &Value) -> Result<Option<HashMap<String, bool>>, FormError> {
    match value {
        Value::Null => Ok(None),
        Value::Object(fields) => fields
            .iter()
            .map(|(name, flag)| {
                flag.as_bool().map(|flag| (name.clone(), flag)).ok_or_else(|| {
                    FormError::InvalidExtra(format!("optional `{name}` must be a boolean"))
                })
            })
            .collect::<Result<HashMap<String, bool>, FormError>>()
            .map(Some),
        other => Err(FormError::InvalidExtra(format!(
            "optionals must be a mapping, found {}",
            FormError::kind_of(other)
        ))),
    }
}

/// A form description stored in a file
///
/// ```toml
/// [controls]
/// email = ["", ["required", "email"]]
/// nickname = ""
///
/// [extra.optionals]
/// nickname = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    /// Field name to node
    pub controls: Value,
    /// Group extras
    #[serde(default)]
    pub extra: Option<Value>,
}

impl FormSchema {
    /// Load a schema file; `.json` files are read as JSON, anything else as TOML
    ///
    /// Only the exact path is read. A missing file is
    /// [`FormError::SchemaNotFound`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading form schema");
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FormError::SchemaNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                FormError::SchemaRead {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&text)
        } else {
            Self::from_toml(&text)
        }
    }

    /// Load `<name>.toml` or `<name>.json` from the configured schema directory
    pub fn load_named(config: &FormsConfig, name: &str) -> Result<Self, FormError> {
        Self::load(config.schema_path(name))
    }

    /// Parse a schema from TOML text
    pub fn from_toml(text: &str) -> Result<Self, FormError> {
        Figment::from(Toml::string(text))
            .extract()
            .map_err(|e| FormError::Config(Box::new(e)))
    }

    /// Parse a schema from JSON text
    pub fn from_json(text: &str) -> Result<Self, FormError> {
        Figment::from(Json::string(text))
            .extract()
            .map_err(|e| FormError::Config(Box::new(e)))
    }

    /// Build the described group
    pub fn build(
        &self,
        registry: &ValidatorRegistry,
        config: &FormsConfig,
    ) -> Result<ControlGroup, FormError> {
        SchemaInterpreter::new(registry, config).group(&self.controls, self.extra.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ControlStatus, FormControl, ValidationErrors};
    use futures_util::FutureExt;
    use serde_json::json;
    use std::sync::Arc;

    fn interpreter(registry: &ValidatorRegistry) -> SchemaInterpreter<'_> {
        SchemaInterpreter::new(registry, &FormsConfig::default())
    }

    #[test]
    fn test_group_dispatch() {
        let registry = ValidatorRegistry::default();
        let form = interpreter(&registry)
            .group(
                &json!({
                    "bare": "a",
                    "single": ["b"],
                    "pair": ["", "required"],
                    "object": {"theme": "dark"},
                }),
                None,
            )
            .unwrap();

        assert_eq!(form.find("bare").unwrap().value(), json!("a"));
        let single = form.get("single").unwrap().as_control().unwrap();
        assert_eq!(single.value(), json!("b"));
        assert!(single.validator().is_none());
        assert!(form.find("pair").unwrap().has_error("required"));
        assert_eq!(form.find("object").unwrap().value(), json!({"theme": "dark"}));
        assert!(form.optionals().is_none());
    }

    #[test]
    fn test_null_validator_slot_with_async() {
        let mut registry = ValidatorRegistry::default();
        registry.register_async(
            "unique",
            Arc::new(|_: &dyn FormControl| async { None::<ValidationErrors> }.boxed()),
        );
        let form = interpreter(&registry)
            .group(&json!({"user": ["ada", null, "unique"]}), None)
            .unwrap();

        let user = form.get("user").unwrap().as_control().unwrap();
        assert!(user.validator().is_none());
        assert!(user.async_validator().is_some());
    }

    #[test]
    fn test_validator_list_is_composed() {
        let registry = ValidatorRegistry::default();
        let form = interpreter(&registry)
            .group(&json!({"code": ["ab", ["minLength:3", "pattern:[0-9]+"]]}), None)
            .unwrap();
        let code = form.find("code").unwrap();
        assert!(code.has_error("minlength"));
        assert!(code.has_error("pattern"));
    }

    #[test]
    fn test_group_requires_mapping() {
        let registry = ValidatorRegistry::default();
        let error = interpreter(&registry).group(&json!(["a"]), None).unwrap_err();
        assert!(matches!(error, FormError::NotAMapping { found: "a sequence", .. }));
    }

    #[test]
    fn test_empty_tuple_is_rejected() {
        let registry = ValidatorRegistry::default();
        let error = interpreter(&registry)
            .group(&json!({"ok": "a", "broken": []}), None)
            .unwrap_err();
        assert!(matches!(error, FormError::EmptyTuple { ref path } if path == "$.broken"));
    }

    #[test]
    fn test_long_tuple_lenient_and_strict() {
        let registry = ValidatorRegistry::default();
        let node = json!({"x": ["a", null, null, "extra"]});

        let form = interpreter(&registry).group(&node, None).unwrap();
        assert_eq!(form.find("x").unwrap().value(), json!("a"));

        let strict = FormsConfig {
            strict_tuples: true,
            ..FormsConfig::default()
        };
        let error = SchemaInterpreter::new(&registry, &strict)
            .group(&node, None)
            .unwrap_err();
        assert!(matches!(error, FormError::TupleTooLong { len: 4, .. }));
    }

    #[test]
    fn test_unknown_validator() {
        let registry = ValidatorRegistry::default();
        let error = interpreter(&registry)
            .group(&json!({"isbn": ["", "isbn"]}), None)
            .unwrap_err();
        assert!(matches!(
            error,
            FormError::UnknownValidator { ref name, ref path } if name == "isbn" && path == "$.isbn"
        ));
    }

    #[test]
    fn test_invalid_validator_spec() {
        let registry = ValidatorRegistry::default();
        let error = interpreter(&registry)
            .group(&json!({"x": ["", 42]}), None)
            .unwrap_err();
        assert!(matches!(error, FormError::InvalidValidatorSpec { .. }));

        let error = interpreter(&registry)
            .group(&json!({"x": ["", ["required", 1]]}), None)
            .unwrap_err();
        assert!(matches!(error, FormError::InvalidValidatorSpec { .. }));
    }

    #[test]
    fn test_extra_options() {
        let registry = ValidatorRegistry::default();
        let form = interpreter(&registry)
            .group(
                &json!({"a": "", "b": "x"}),
                Some(&json!({
                    "optionals": {"a": false},
                    "validator": "nullValidator",
                })),
            )
            .unwrap();

        assert_eq!(form.optionals().unwrap().get("a"), Some(&false));
        assert!(form.validator().is_some());
        assert_eq!(form.value(), json!({"b": "x"}));
    }

    #[test]
    fn test_invalid_extra() {
        let registry = ValidatorRegistry::default();
        let interpreter = interpreter(&registry);

        let error = interpreter.group(&json!({}), Some(&json!("nope"))).unwrap_err();
        assert!(matches!(error, FormError::InvalidExtra(_)));

        let error = interpreter
            .group(&json!({}), Some(&json!({"optionals": {"a": "yes"}})))
            .unwrap_err();
        assert!(matches!(error, FormError::InvalidExtra(_)));
    }

    #[test]
    fn test_array_description() {
        let registry = ValidatorRegistry::default();
        let array = interpreter(&registry)
            .array(&json!(["a", ["b"], ["", "required"]]), Some(&json!("required")), None)
            .unwrap();

        assert_eq!(array.len(), 3);
        assert_eq!(array.value(), json!(["a", "b", ""]));
        assert!(array.validator().is_some());
        assert_eq!(array.status(), ControlStatus::Invalid);

        let error = interpreter(&registry).array(&json!({}), None, None).unwrap_err();
        assert!(matches!(error, FormError::NotASequence { .. }));
    }

    #[test]
    fn test_schema_from_toml() {
        let schema = FormSchema::from_toml(
            r#"
            [controls]
            email = ["", ["required", "email"]]
            nickname = ""

            [extra.optionals]
            nickname = false
            "#,
        )
        .unwrap();

        let form = schema
            .build(&ValidatorRegistry::default(), &FormsConfig::default())
            .unwrap();
        assert!(form.find("email").unwrap().has_error("required"));
        assert!(!form.contains("nickname"));
    }

    #[test]
    fn test_schema_from_json() {
        let schema = FormSchema::from_json(r#"{"controls": {"age": [30]}}"#).unwrap();
        assert!(schema.extra.is_none());

        let form = schema
            .build(&ValidatorRegistry::default(), &FormsConfig::default())
            .unwrap();
        assert_eq!(form.value(), json!({"age": 30}));
    }

    #[test]
    fn test_schema_requires_controls() {
        assert!(matches!(
            FormSchema::from_toml("title = \"x\""),
            Err(FormError::Config(_))
        ));
    }

    #[test]
    fn test_load_does_not_search_parent_directories() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("signup.toml", "[controls]\nfrom_parent = \"yes\"")?;
            jail.create_dir("child")?;
            jail.change_dir("child")?;

            let result = FormSchema::load("signup.toml");
            assert!(matches!(
                result,
                Err(FormError::SchemaNotFound { ref path }) if path.as_path() == Path::new("signup.toml")
            ));
            Ok(())
        });
    }

    #[test]
    fn test_load_reads_relative_path() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("signup.json", r#"{"controls": {"email": ""}}"#)?;

            let schema = FormSchema::load("signup.json").unwrap();
            assert_eq!(schema.controls, json!({"email": ""}));
            Ok(())
        });
    }
}
