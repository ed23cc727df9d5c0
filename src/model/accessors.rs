use serde_json::{Map, Value};

use super::{Model, SetOutcome};
use crate::error::ModelError;

/// Read access to declared properties, honoring `use_getters`.
pub struct Values<'a> {
    model: &'a Model,
}

impl<'a> Values<'a> {
    pub(super) fn new(model: &'a Model) -> Self {
        Self { model }
    }

    pub fn get(&self, property: &str) -> Result<Value, ModelError> {
        getter(self.model, property)?;
        self.model.get(property)
    }

    /// Declared property names in schema order.
    pub fn names(&self) -> impl Iterator<Item = &'a str> {
        self.model.blueprint.schema.keys()
    }

    /// Every declared property read through its getter.
    pub fn to_map(&self) -> Result<Map<String, Value>, ModelError> {
        self.names()
            .map(|name| Ok((name.to_string(), self.get(name)?)))
            .collect()
    }
}

/// Read and write access to declared properties, honoring
/// `use_getters` and `use_setters`.
pub struct ValuesMut<'a> {
    model: &'a mut Model,
}

impl<'a> ValuesMut<'a> {
    pub(super) fn new(model: &'a mut Model) -> Self {
        Self { model }
    }

    pub fn get(&self, property: &str) -> Result<Value, ModelError> {
        getter(self.model, property)?;
        self.model.get(property)
    }

    pub fn set(&mut self, property: &str, value: impl Into<Value>) -> Result<SetOutcome, ModelError> {
        if !self.model.options.use_setters || !self.model.blueprint.schema.contains(property) {
            return Err(unavailable(property));
        }
        self.model.set(property, value)
    }
}

fn getter(model: &Model, property: &str) -> Result<(), ModelError> {
    if model.options.use_getters && model.blueprint.schema.contains(property) {
        Ok(())
    } else {
        Err(unavailable(property))
    }
}

fn unavailable(property: &str) -> ModelError {
    ModelError::AccessorUnavailable {
        property: property.to_string(),
    }
}
