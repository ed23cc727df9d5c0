//! Per-model settings.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::filter::FilterSettings;
use crate::validation::Validator;

/// Settings of one model instance.
///
/// Scalar settings deserialize from JSON with camelCase or snake_case keys;
/// validators are attached in code.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelOptions {
    /// Case strategy applied to keys by `to_json` when none is given.
    #[serde(alias = "name_strategy")]
    pub name_strategy: Option<String>,
    /// Only schema-declared properties may be written.
    pub strict: bool,
    /// Strict-mode writes to undeclared properties fail instead of being dropped.
    #[serde(alias = "throw_on_strict_error")]
    pub throw_on_strict_error: bool,
    #[serde(alias = "return_empty_value")]
    pub return_empty_value: bool,
    /// `set` returns a modified copy and leaves the model untouched.
    pub immutable: bool,
    #[serde(alias = "use_getters")]
    pub use_getters: bool,
    #[serde(alias = "use_setters")]
    pub use_setters: bool,
    #[serde(skip)]
    pub validators: Vec<Validator>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        ModelOptions {
            name_strategy: None,
            strict: false,
            throw_on_strict_error: false,
            return_empty_value: true,
            immutable: false,
            use_getters: true,
            use_setters: true,
            validators: Vec::new(),
        }
    }
}

impl ModelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse scalar settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn name_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.name_strategy = Some(strategy.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn throw_on_strict_error(mut self, throw: bool) -> Self {
        self.throw_on_strict_error = throw;
        self
    }

    pub fn return_empty_value(mut self, enabled: bool) -> Self {
        self.return_empty_value = enabled;
        self
    }

    pub fn immutable(mut self, immutable: bool) -> Self {
        self.immutable = immutable;
        self
    }

    pub fn use_getters(mut self, enabled: bool) -> Self {
        self.use_getters = enabled;
        self
    }

    pub fn use_setters(mut self, enabled: bool) -> Self {
        self.use_setters = enabled;
        self
    }

    /// Append a whole-model validator.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn filter_settings(&self) -> FilterSettings {
        FilterSettings {
            return_empty_value: self.return_empty_value,
        }
    }

    /// Read a scalar setting by key.
    pub fn get_option(&self, key: &str) -> Result<Value, ModelError> {
        let value = match canonical_key(key)? {
            OptionKey::NameStrategy => self
                .name_strategy
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
            OptionKey::Strict => Value::Bool(self.strict),
            OptionKey::ThrowOnStrictError => Value::Bool(self.throw_on_strict_error),
            OptionKey::ReturnEmptyValue => Value::Bool(self.return_empty_value),
            OptionKey::Immutable => Value::Bool(self.immutable),
            OptionKey::UseGetters => Value::Bool(self.use_getters),
            OptionKey::UseSetters => Value::Bool(self.use_setters),
        };
        Ok(value)
    }

    /// Change a scalar setting by key. The value must have the setting's type.
    pub fn set_option(&mut self, key: &str, value: Value) -> Result<(), ModelError> {
        let option = canonical_key(key)?;
        if let OptionKey::NameStrategy = option {
            self.name_strategy = match value {
                Value::Null => None,
                Value::String(strategy) => Some(strategy),
                other => return Err(invalid(key, "expected a string or null", &other)),
            };
            return Ok(());
        }

        let flag = value
            .as_bool()
            .ok_or_else(|| invalid(key, "expected a boolean", &value))?;
        match option {
            OptionKey::Strict => self.strict = flag,
            OptionKey::ThrowOnStrictError => self.throw_on_strict_error = flag,
            OptionKey::ReturnEmptyValue => self.return_empty_value = flag,
            OptionKey::Immutable => self.immutable = flag,
            OptionKey::UseGetters => self.use_getters = flag,
            OptionKey::UseSetters => self.use_setters = flag,
            OptionKey::NameStrategy => {}
        }
        Ok(())
    }
}

enum OptionKey {
    NameStrategy,
    Strict,
    ThrowOnStrictError,
    ReturnEmptyValue,
    Immutable,
    UseGetters,
    UseSetters,
}

fn canonical_key(key: &str) -> Result<OptionKey, ModelError> {
    let option = match key {
        "nameStrategy" | "name_strategy" => OptionKey::NameStrategy,
        "strict" => OptionKey::Strict,
        "throwOnStrictError" | "throw_on_strict_error" => OptionKey::ThrowOnStrictError,
        "returnEmptyValue" | "return_empty_value" => OptionKey::ReturnEmptyValue,
        "immutable" => OptionKey::Immutable,
        "useGetters" | "use_getters" => OptionKey::UseGetters,
        "useSetters" | "use_setters" => OptionKey::UseSetters,
        _ => {
            return Err(ModelError::UnknownOption {
                key: key.to_string(),
            })
        }
    };
    Ok(option)
}

fn invalid(key: &str, expected: &str, got: &Value) -> ModelError {
    ModelError::InvalidOption {
        key: key.to_string(),
        message: format!("{expected}, got {got}"),
    }
}

impl fmt::Debug for ModelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelOptions")
            .field("name_strategy", &self.name_strategy)
            .field("strict", &self.strict)
            .field("throw_on_strict_error", &self.throw_on_strict_error)
            .field("return_empty_value", &self.return_empty_value)
            .field("immutable", &self.immutable)
            .field("use_getters", &self.use_getters)
            .field("use_setters", &self.use_setters)
            .field("validators", &self.validators.len())
            .finish()
    }
}
