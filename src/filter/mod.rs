//! Filters - coercion functions that normalize raw property values.
//!
//! A property's [`Filter`] is resolved once, when the model is built, through a
//! [`FilterRegistry`]. Built-in kinds are plain enum variants; host
//! applications add named filters with [`FilterRegistry::register`].
//!
//! ## Example
//!
//! ```ignore
//! use schema_model::{Filter, FilterRegistry};
//!
//! let mut registry = FilterRegistry::new();
//! registry.register("upper", |value, _settings| {
//!     Ok(value.as_str().map(str::to_uppercase).into())
//! });
//!
//! let upper = registry.resolve(&Filter::from("upper"))?;
//! ```

pub mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::error::ModelError;
use crate::model::ModelFactory;

/// Options handed to every filter invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSettings {
    /// Substitute the type's empty value for `null` input.
    pub return_empty_value: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        FilterSettings {
            return_empty_value: true,
        }
    }
}

/// Failure raised by a filter function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FilterError {
    pub message: String,
}

impl FilterError {
    pub fn new(message: impl Into<String>) -> Self {
        FilterError {
            message: message.into(),
        }
    }
}

/// A resolved coercion function.
pub type FilterFn = Arc<dyn Fn(&Value, &FilterSettings) -> Result<Value, FilterError> + Send + Sync>;

/// Declarative filter of a schema property.
#[derive(Clone, Default)]
pub enum Filter {
    /// No coercion.
    #[default]
    Identity,
    String,
    Number,
    Integer,
    Array,
    Boolean,
    /// Looked up in the registry at model construction.
    Named(String),
    /// Inline coercion, used as-is.
    Custom(FilterFn),
    /// Materializes a nested model from the raw value.
    Model(ModelFactory),
}

impl Filter {
    /// Inline fallible coercion.
    pub fn custom<F>(filter: F) -> Self
    where
        F: Fn(&Value, &FilterSettings) -> Result<Value, FilterError> + Send + Sync + 'static,
    {
        Filter::Custom(Arc::new(filter))
    }

    /// Inline infallible coercion that ignores filter settings.
    ///
    /// Computed properties receive their dependency values as a JSON array.
    pub fn map<F>(filter: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Filter::Custom(Arc::new(
            move |value: &Value, _: &FilterSettings| -> Result<Value, FilterError> {
                Ok(filter(value))
            },
        ))
    }

    /// Nested model filter.
    pub fn model(factory: ModelFactory) -> Self {
        Filter::Model(factory)
    }

    /// Built-in kind for a filter identifier or native type name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "string" | "String" => Some(Filter::String),
            "number" | "Number" => Some(Filter::Number),
            "integer" | "Integer" => Some(Filter::Integer),
            "array" | "Array" => Some(Filter::Array),
            "boolean" | "Boolean" => Some(Filter::Boolean),
            _ => None,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Filter::Identity)
    }
}

impl From<&str> for Filter {
    fn from(name: &str) -> Self {
        if name.is_empty() {
            return Filter::Identity;
        }
        Filter::builtin(name).unwrap_or_else(|| Filter::Named(name.to_string()))
    }
}

impl From<String> for Filter {
    fn from(name: String) -> Self {
        Filter::from(name.as_str())
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Identity => write!(f, "Identity"),
            Filter::String => write!(f, "String"),
            Filter::Number => write!(f, "Number"),
            Filter::Integer => write!(f, "Integer"),
            Filter::Array => write!(f, "Array"),
            Filter::Boolean => write!(f, "Boolean"),
            Filter::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Filter::Custom(_) => write!(f, "Custom(..)"),
            Filter::Model(_) => write!(f, "Model(..)"),
        }
    }
}

/// Named filters available to a model, on top of the built-ins.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    named: HashMap<String, FilterFn>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named filter. Built-in names cannot be shadowed.
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F) -> &mut Self
    where
        F: Fn(&Value, &FilterSettings) -> Result<Value, FilterError> + Send + Sync + 'static,
    {
        self.named.insert(name.into(), Arc::new(filter));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        Filter::builtin(name).is_some() || self.named.contains_key(name)
    }

    /// Resolve a declarative filter into a callable coercion.
    pub fn resolve(&self, filter: &Filter) -> Result<FilterFn, ModelError> {
        let resolved: FilterFn = match filter {
            Filter::Identity => Arc::new(identity),
            Filter::String => Arc::new(builtin::string),
            Filter::Number => Arc::new(builtin::number),
            Filter::Integer => Arc::new(builtin::integer),
            Filter::Array => Arc::new(builtin::array),
            Filter::Boolean => Arc::new(builtin::boolean),
            Filter::Named(name) => match Filter::builtin(name) {
                Some(kind) => return self.resolve(&kind),
                None => self
                    .named
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ModelError::UnknownFilter { name: name.clone() })?,
            },
            Filter::Custom(filter) => Arc::clone(filter),
            Filter::Model(factory) => {
                let factory = factory.clone();
                Arc::new(move |value: &Value, settings: &FilterSettings| {
                    factory.materialize_json(value, settings)
                })
            }
        };
        Ok(resolved)
    }
}

fn identity(value: &Value, _: &FilterSettings) -> Result<Value, FilterError> {
    Ok(value.clone())
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.named.keys().collect();
        names.sort();
        f.debug_struct("FilterRegistry").field("named", &names).finish()
    }
}
