use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::{as_object, Model};
use crate::error::ModelError;
use crate::filter::Filter;
use crate::validation::DEFAULT_GROUP;

impl Model {
    /// Serialize the properties visible in `group`.
    ///
    /// Keys go through the case converter with `name_strategy`, or the
    /// model's own strategy when `None`. Nested models serialize with the same
    /// group and strategy.
    pub fn to_json(&self, group: &str, name_strategy: Option<&str>) -> Result<Value, ModelError> {
        let strategy = name_strategy.or(self.options.name_strategy.as_deref());
        let mut out = Map::new();
        for (property, descriptor) in self.blueprint.schema.iter() {
            if !descriptor.json().visible_in(group) {
                continue;
            }
            let value = match descriptor.filter_spec() {
                Filter::Model(_) if self.nested_is_unset(property) => Value::Null,
                Filter::Model(_) => self.get_model(property)?.to_json(group, strategy)?,
                _ => self.get(property)?,
            };
            out.insert(self.blueprint.case_converter.convert(strategy, property), value);
        }
        Ok(Value::Object(out))
    }

    pub fn to_json_default(&self) -> Result<Value, ModelError> {
        self.to_json(DEFAULT_GROUP, None)
    }

    /// New instance with this model's schema and options, loaded from `data`.
    ///
    /// Keys written by `to_json` under the model's name strategy map back to
    /// their properties; computed properties are rebuilt rather than loaded.
    pub fn from_json(&self, data: &Value) -> Result<Model, ModelError> {
        let mut model = self.blank()?;
        model.load_json(data)?;
        Ok(model)
    }

    /// Decode the default-group JSON into a typed value.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, ModelError> {
        serde_json::from_value(self.to_json_default()?)
            .map_err(|source| ModelError::Decode { source })
    }

    pub(crate) fn load_json(&mut self, data: &Value) -> Result<(), ModelError> {
        let data = as_object(data)?;
        let names = self.incoming_names();
        let entries: Vec<(String, Value)> = data
            .iter()
            .map(|(key, value)| {
                let property = names.get(key.as_str()).cloned().unwrap_or_else(|| key.clone());
                (property, value.clone())
            })
            .filter(|(property, _)| !self.blueprint.schema.is_computed(property))
            .collect();

        self.check_strict_entries(&entries)?;
        self.apply_all(entries)?;
        Ok(())
    }

    /// A nested model with no stored data reads as `null` unless empty values
    /// are materialized.
    fn nested_is_unset(&self, property: &str) -> bool {
        !self.options.return_empty_value
            && self.storage.get(property).map_or(true, Value::is_null)
    }

    /// Serialized key to property name, for keys the strategy renames.
    fn incoming_names(&self) -> HashMap<String, String> {
        let strategy = self.options.name_strategy.as_deref();
        self.blueprint
            .schema
            .keys()
            .filter_map(|property| {
                let key = self.blueprint.case_converter.convert(strategy, property);
                let renamed = key != property && !self.blueprint.schema.contains(&key);
                renamed.then(|| (key, property.to_string()))
            })
            .collect()
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_default()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Model;
    use crate::options::ModelOptions;
    use crate::schema::{PropertyDescriptor, Schema};
    use serde::Deserialize;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .property("first_name", PropertyDescriptor::new().filter("string").value("Ada"))
            .property("age", PropertyDescriptor::new().filter("integer").value(36))
            .property("secret", PropertyDescriptor::new().value("x").hidden())
            .property(
                "notes",
                PropertyDescriptor::new().value("n").json_groups(["admin"]),
            )
    }

    #[test]
    fn name_strategy_renames_keys() {
        let model = Model::new(schema(), ModelOptions::default()).unwrap();
        let out = model.to_json("admin", Some("camel")).unwrap();
        assert_eq!(out, json!({"firstName": "Ada", "age": 36, "notes": "n"}));
    }

    #[test]
    fn from_json_maps_renamed_keys_back() {
        let model = Model::new(schema(), ModelOptions::default().name_strategy("camel")).unwrap();
        let copy = model.from_json(&json!({"firstName": "Grace"})).unwrap();
        assert_eq!(copy.get("first_name").unwrap(), json!("Grace"));
        assert!(!copy.has("firstName"));
    }

    #[test]
    fn serialize_uses_default_group() {
        let model = Model::new(schema(), ModelOptions::default()).unwrap();
        let text = serde_json::to_string(&model).unwrap();
        assert_eq!(text, r#"{"first_name":"Ada","age":36,"notes":"n"}"#);
    }

    #[test]
    fn to_typed_decodes_visible_properties() {
        #[derive(Deserialize)]
        struct Person {
            first_name: String,
            age: i64,
        }

        let model = Model::new(schema(), ModelOptions::default()).unwrap();
        let person: Person = model.to_typed().unwrap();
        assert_eq!(person.first_name, "Ada");
        assert_eq!(person.age, 36);
    }
}
