use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::{DeclaredModel, Model};
use crate::error::ModelError;
use crate::filter::{FilterError, FilterSettings};
use crate::options::ModelOptions;
use crate::schema::Schema;

type BuildFn = Arc<dyn Fn() -> Result<Model, ModelError> + Send + Sync>;

/// Creates blank models of one kind. Backs [`Filter::Model`](crate::Filter::Model).
#[derive(Clone)]
pub struct ModelFactory {
    build: BuildFn,
}

impl ModelFactory {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn() -> Result<Model, ModelError> + Send + Sync + 'static,
    {
        Self {
            build: Arc::new(build),
        }
    }

    pub fn from_schema(schema: Schema, options: ModelOptions) -> Self {
        Self::new(move || Model::new(schema.clone(), options.clone()))
    }

    pub fn of<T: DeclaredModel + 'static>() -> Self {
        Self::new(T::create)
    }

    pub fn create(&self) -> Result<Model, ModelError> {
        (self.build)()
    }

    /// Model loaded from `value`; `null` gives a model with defaults only.
    pub fn from_value(&self, value: &Value) -> Result<Model, ModelError> {
        let mut model = self.create()?;
        if !value.is_null() {
            model.load_json(value)?;
        }
        Ok(model)
    }

    /// Filter form: the nested model's default-group JSON.
    pub(crate) fn materialize_json(
        &self,
        value: &Value,
        settings: &FilterSettings,
    ) -> Result<Value, FilterError> {
        if value.is_null() && !settings.return_empty_value {
            return Ok(Value::Null);
        }
        self.from_value(value)
            .and_then(|model| model.to_json_default())
            .map_err(|err| FilterError::new(err.to_string()))
    }
}

impl fmt::Debug for ModelFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelFactory").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::schema::PropertyDescriptor;
    use serde_json::json;

    fn address() -> ModelFactory {
        let schema = Schema::new()
            .property("city", PropertyDescriptor::new().filter("string").value("Paris"))
            .property("zip", PropertyDescriptor::new().filter("string"));
        ModelFactory::from_schema(schema, ModelOptions::default())
    }

    #[test]
    fn from_value_loads_objects() {
        let model = address().from_value(&json!({"zip": 75001})).unwrap();
        assert_eq!(model.get("zip").unwrap(), json!("75001"));
        assert_eq!(model.get("city").unwrap(), json!("Paris"));
    }

    #[test]
    fn null_materializes_defaults_unless_disabled() {
        let factory = address();
        let on = factory
            .materialize_json(&Value::Null, &FilterSettings::default())
            .unwrap();
        assert_eq!(on, json!({"city": "Paris", "zip": ""}));

        let off = factory
            .materialize_json(&Value::Null, &FilterSettings { return_empty_value: false })
            .unwrap();
        assert_eq!(off, Value::Null);
    }

    #[test]
    fn unset_nested_model_serializes_like_get() {
        let schema = Schema::new()
            .property("name", PropertyDescriptor::new().value("Ada"))
            .property("address", PropertyDescriptor::new().filter(Filter::Model(address())));

        let raw = Model::new(schema.clone(), ModelOptions::default().return_empty_value(false))
            .unwrap();
        assert_eq!(raw.get("address").unwrap(), Value::Null);
        assert_eq!(raw.to_json_default().unwrap()["address"], Value::Null);

        let filled = Model::new(schema, ModelOptions::default()).unwrap();
        let expected = json!({"city": "Paris", "zip": ""});
        assert_eq!(filled.get("address").unwrap(), expected);
        assert_eq!(filled.to_json_default().unwrap()["address"], expected);
    }

    #[test]
    fn scalars_are_rejected() {
        let err = address()
            .materialize_json(&json!(5), &FilterSettings::default())
            .unwrap_err();
        assert_eq!(err.message, "expected a JSON object, got number");
    }
}
