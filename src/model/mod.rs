//! Models - live, schema-driven property bags.
//!
//! A [`Model`] is built from a [`Schema`] and [`ModelOptions`]. It coerces
//! reads through property filters, keeps computed properties up to date,
//! publishes change events and validates itself asynchronously.
//!
//! ## Example
//!
//! ```ignore
//! use schema_model::{Filter, Model, ModelOptions, PropertyDescriptor, Schema};
//!
//! let schema = Schema::new()
//!     .property("first_name", PropertyDescriptor::new().value("Ada"))
//!     .property("last_name", PropertyDescriptor::new().value("Byron"))
//!     .property(
//!         "full_name",
//!         PropertyDescriptor::new()
//!             .computed(["first_name", "last_name"])
//!             .filter(Filter::map(join_words)),
//!     );
//!
//! let mut user = Model::new(schema, ModelOptions::default())?;
//! user.set("last_name", "Lovelace")?;
//! assert_eq!(user.get("full_name")?, "Ada Lovelace");
//!
//! let failures = user.validate("signup").await?;
//! ```

mod accessors;
mod builder;
mod declared;
mod factory;
mod json;

pub use accessors::{Values, ValuesMut};
pub use builder::ModelBuilder;
pub use declared::DeclaredModel;
pub use factory::ModelFactory;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::case::CaseConverter;
use crate::computed::{ComputedEngine, EngineState};
use crate::emitter::{ChangeChannel, ChangeEvent, Delivery, SubscriptionId};
use crate::error::ModelError;
use crate::filter::{Filter, FilterFn};
use crate::options::ModelOptions;
use crate::schema::{extract_defaults, Schema};
use crate::storage::{top_segment, PathAccessor, Storage};
use crate::validation::{TaskRunner, ValidationFailure, ValidationPlan};

/// Everything resolved once per schema and shared by derived instances.
pub(crate) struct Blueprint {
    pub(crate) schema: Schema,
    pub(crate) filters: HashMap<String, FilterFn>,
    pub(crate) case_converter: Arc<dyn CaseConverter>,
    pub(crate) accessor: Arc<dyn PathAccessor>,
}

/// Result of an accepted `set` or `merge`.
#[derive(Debug)]
pub enum SetOutcome {
    /// The model changed in place.
    Mutated,
    /// Strict mode dropped the write.
    Ignored,
    /// Immutable mode: the changed copy. The original is untouched.
    Derived(Model),
}

impl SetOutcome {
    pub fn is_mutated(&self) -> bool {
        matches!(self, SetOutcome::Mutated)
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, SetOutcome::Ignored)
    }

    pub fn into_derived(self) -> Option<Model> {
        match self {
            SetOutcome::Derived(model) => Some(model),
            _ => None,
        }
    }
}

pub struct Model {
    blueprint: Arc<Blueprint>,
    options: ModelOptions,
    storage: Storage,
    channel: ChangeChannel,
    engine: ComputedEngine,
}

impl Model {
    /// Build a model with the built-in filters and `heck` case conversion.
    pub fn new(schema: Schema, options: ModelOptions) -> Result<Self, ModelError> {
        ModelBuilder::new(schema).options(options).build()
    }

    pub fn builder(schema: Schema) -> ModelBuilder {
        ModelBuilder::new(schema)
    }

    pub(crate) fn from_blueprint(
        blueprint: Arc<Blueprint>,
        options: ModelOptions,
    ) -> Result<Self, ModelError> {
        let storage = Storage::with_accessor(
            extract_defaults(&blueprint.schema),
            Arc::clone(&blueprint.accessor),
        );
        let mut model = Model {
            blueprint: Arc::clone(&blueprint),
            options,
            storage,
            channel: ChangeChannel::new(),
            engine: ComputedEngine::new(),
        };

        model.engine.subscribe(&blueprint.schema, &mut model.channel);
        for property in blueprint.schema.computed_properties() {
            model.recompute(property)?;
        }
        Ok(model)
    }

    pub fn schema(&self) -> &Schema {
        &self.blueprint.schema
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn get_option(&self, key: &str) -> Result<Value, ModelError> {
        self.options.get_option(key)
    }

    pub fn set_option(&mut self, key: &str, value: Value) -> Result<(), ModelError> {
        self.options.set_option(key, value)
    }

    /// Storage version: 1 after construction, +1 per accepted direct write.
    pub fn version(&self) -> u64 {
        self.storage.version()
    }

    pub fn state(&self) -> &EngineState {
        self.engine.state()
    }

    /// Read a value through its property filter. Missing values read as `null`.
    pub fn get(&self, path: &str) -> Result<Value, ModelError> {
        self.get_or(path, Value::Null)
    }

    /// Read a value through its property filter, falling back to `default`.
    pub fn get_or(&self, path: &str, default: Value) -> Result<Value, ModelError> {
        let raw = self.storage.get_or(path, default);
        if self.blueprint.schema.is_computed(path) {
            return Ok(raw);
        }
        match self.blueprint.filters.get(path) {
            Some(filter) => filter(&raw, &self.options.filter_settings()).map_err(|source| {
                ModelError::Filter {
                    property: path.to_string(),
                    source,
                }
            }),
            None => Ok(raw),
        }
    }

    pub fn has(&self, path: &str) -> bool {
        self.storage.has(path)
    }

    /// Raw stored values, without filters.
    pub fn raw_values(&self) -> Map<String, Value> {
        self.storage.snapshot()
    }

    /// Write a value.
    ///
    /// Dotted paths write nested data; the change is published under the
    /// top-level property.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<SetOutcome, ModelError> {
        let value = value.into();
        if self.engine.is_disposed() {
            return Err(ModelError::Disposed);
        }
        let property = top_segment(path);
        if self.blueprint.schema.is_computed(property) {
            return Err(ModelError::ComputedPropertyWrite {
                property: property.to_string(),
            });
        }
        if self.options.strict && !self.blueprint.schema.contains(property) {
            if self.options.throw_on_strict_error {
                return Err(ModelError::UnknownProperty {
                    property: property.to_string(),
                });
            }
            warn!(property, "strict model dropped write to undeclared property");
            return Ok(SetOutcome::Ignored);
        }

        if self.options.immutable {
            let mut derived = self.try_clone()?;
            derived.apply(path, value)?;
            return Ok(SetOutcome::Derived(derived));
        }

        self.apply(path, value)?;
        Ok(SetOutcome::Mutated)
    }

    /// Set every permitted key of `data`.
    ///
    /// Strict models with `throw_on_strict_error` reject the whole object
    /// before writing anything if it holds an undeclared key.
    pub fn merge(&mut self, data: &Value) -> Result<SetOutcome, ModelError> {
        let data = as_object(data)?;
        if self.engine.is_disposed() {
            return Err(ModelError::Disposed);
        }
        for key in data.keys() {
            let property = top_segment(key);
            if self.blueprint.schema.is_computed(property) {
                return Err(ModelError::ComputedPropertyWrite {
                    property: property.to_string(),
                });
            }
        }
        self.check_strict_keys(data.keys().map(String::as_str))?;

        let entries: Vec<(String, Value)> =
            data.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

        if self.options.immutable {
            let mut derived = self.try_clone()?;
            derived.apply_all(entries)?;
            return Ok(SetOutcome::Derived(derived));
        }

        if self.apply_all(entries)? == 0 {
            return Ok(SetOutcome::Ignored);
        }
        Ok(SetOutcome::Mutated)
    }

    /// Independent copy rebuilt from the current raw values.
    pub fn try_clone(&self) -> Result<Model, ModelError> {
        let mut copy = self.blank()?;
        let entries: Vec<(String, Value)> = self
            .storage
            .snapshot()
            .into_iter()
            .filter(|(key, _)| !self.blueprint.schema.is_computed(key))
            .collect();
        copy.check_strict_entries(&entries)?;
        copy.apply_all(entries)?;
        Ok(copy)
    }

    /// Materialize a property declared with [`Filter::Model`].
    pub fn get_model(&self, property: &str) -> Result<Model, ModelError> {
        let Some(Filter::Model(factory)) = self
            .blueprint
            .schema
            .get(property)
            .map(|descriptor| descriptor.filter_spec())
        else {
            return Err(ModelError::AccessorUnavailable {
                property: property.to_string(),
            });
        };
        factory.from_value(self.storage.get(property).unwrap_or(&Value::Null))
    }

    pub fn subscribe<F>(&mut self, property: impl Into<String>, listener: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.channel.subscribe(property, Arc::new(listener))
    }

    pub fn subscribe_all<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.channel.subscribe_all(Arc::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.channel.unsubscribe(id)
    }

    /// Release every subscription. Later writes fail with [`ModelError::Disposed`].
    pub fn dispose(&mut self) {
        if self.engine.is_disposed() {
            return;
        }
        self.engine.dispose(&mut self.channel);
        self.channel.clear();
        debug!("model disposed");
    }

    /// Schedule every check that applies to `group`.
    pub fn prepare_validation(&self, group: &str) -> Result<ValidationPlan, ModelError> {
        let mut plan = ValidationPlan::new(group);
        for (property, descriptor) in self.blueprint.schema.iter() {
            if descriptor.checks().next().is_none() {
                continue;
            }
            let value = self.get(property)?;
            plan.schedule_property(property, &value, descriptor.checks());
        }
        if !self.options.validators.is_empty() {
            let snapshot = self.to_json_default()?;
            plan.schedule_validators(&snapshot, &self.options.validators);
        }
        Ok(plan)
    }

    /// Validate under `group`.
    ///
    /// The returned future does not borrow the model. It resolves to the
    /// failures in scheduling order, or rejects with the first pipeline fault.
    pub fn validate(
        &self,
        group: &str,
    ) -> impl Future<Output = Result<Vec<ValidationFailure>, ModelError>> + Send + 'static {
        let plan = self.prepare_validation(group);
        async move { plan?.run().await }
    }

    /// Validate on `runner` and hand the outcome to `callback`.
    pub fn validate_with<R, F>(&self, group: &str, runner: &R, callback: F)
    where
        R: TaskRunner + ?Sized,
        F: FnOnce(Result<Vec<ValidationFailure>, ModelError>) + Send + 'static,
    {
        let validation = self.validate(group);
        runner.spawn(async move { callback(validation.await) }.boxed());
    }

    pub fn values(&self) -> Values<'_> {
        Values::new(self)
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_> {
        ValuesMut::new(self)
    }

    fn blank(&self) -> Result<Model, ModelError> {
        Model::from_blueprint(Arc::clone(&self.blueprint), self.options.clone())
    }

    fn check_strict_keys<'a>(&self, keys: impl Iterator<Item = &'a str>) -> Result<(), ModelError> {
        if !(self.options.strict && self.options.throw_on_strict_error) {
            return Ok(());
        }
        for key in keys {
            let property = top_segment(key);
            if !self.blueprint.schema.contains(property) {
                return Err(ModelError::UnknownProperty {
                    property: property.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_strict_entries(&self, entries: &[(String, Value)]) -> Result<(), ModelError> {
        self.check_strict_keys(entries.iter().map(|(key, _)| key.as_str()))
    }

    /// Write permitted entries in place. Returns how many were written.
    fn apply_all(&mut self, entries: Vec<(String, Value)>) -> Result<usize, ModelError> {
        let mut written = 0;
        for (key, value) in entries {
            if self.options.strict && !self.blueprint.schema.contains(top_segment(&key)) {
                warn!(property = %key, "strict model dropped undeclared key");
                continue;
            }
            self.apply(&key, value)?;
            written += 1;
        }
        Ok(written)
    }

    /// Write in place, bump the version and publish the change.
    fn apply(&mut self, path: &str, value: Value) -> Result<(), ModelError> {
        let property = top_segment(path).to_string();
        let has_dependents = self.blueprint.schema.dependents_of(&property).next().is_some();
        self.engine.ensure_writable(has_dependents)?;

        let old_value = self.storage.get(path).cloned();
        let version = self.storage.set(path, value.clone());
        debug!(property = %property, path, version, "property set");

        self.publish(ChangeEvent {
            property,
            path: path.to_string(),
            value,
            old_value,
        })
    }

    fn publish(&mut self, event: ChangeEvent) -> Result<(), ModelError> {
        for delivery in self.channel.deliveries(&event.property) {
            match delivery {
                Delivery::Notify(listener) => listener(&event),
                Delivery::Recompute(target) => self.recompute(&target)?,
            }
        }
        Ok(())
    }

    fn recompute(&mut self, property: &str) -> Result<(), ModelError> {
        if !self.engine.enter(property)? {
            return Ok(());
        }
        let result = self.recompute_value(property);
        self.engine.leave();
        if let Err(err) = &result {
            self.engine.fault(property, err);
        }
        result
    }

    fn recompute_value(&mut self, property: &str) -> Result<(), ModelError> {
        let blueprint = Arc::clone(&self.blueprint);
        let Some(descriptor) = blueprint.schema.get(property) else {
            return Ok(());
        };

        let dependencies = descriptor
            .dependencies()
            .iter()
            .map(|dependency| self.get(dependency))
            .collect::<Result<Vec<_>, _>>()?;
        let inputs = Value::Array(dependencies);
        let value = match blueprint.filters.get(property) {
            Some(filter) => filter(&inputs, &self.options.filter_settings()).map_err(|source| {
                ModelError::ComputeFailed {
                    property: property.to_string(),
                    source,
                }
            })?,
            None => inputs,
        };

        let old_value = self.storage.get(property).cloned();
        self.storage.put_derived(property, value.clone());
        debug!(property, "computed property recomputed");

        self.publish(ChangeEvent {
            property: property.to_string(),
            path: property.to_string(),
            value,
            old_value,
        })
    }
}

fn as_object(data: &Value) -> Result<&Map<String, Value>, ModelError> {
    data.as_object().ok_or_else(|| ModelError::NotAnObject {
        found: json_type(data).to_string(),
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Drop for Model {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("properties", &self.blueprint.schema.keys().collect::<Vec<_>>())
            .field("storage", &self.storage)
            .field("options", &self.options)
            .field("state", self.engine.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyDescriptor;
    use serde_json::json;
    use std::sync::Mutex;

    fn join_words(deps: &Value) -> Value {
        let words: Vec<String> = deps
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();
        Value::String(words.join(" "))
    }

    fn person(options: ModelOptions) -> Model {
        let schema = Schema::new()
            .property("first_name", PropertyDescriptor::new().filter("string").value("A"))
            .property("last_name", PropertyDescriptor::new().filter("string").value("B"))
            .property(
                "full_name",
                PropertyDescriptor::new()
                    .computed(["first_name", "last_name"])
                    .filter(Filter::map(join_words)),
            );
        Model::new(schema, options).unwrap()
    }

    #[test]
    fn construction_seeds_computed_values() {
        let model = person(ModelOptions::default());
        assert_eq!(model.get("full_name").unwrap(), json!("A B"));
        assert_eq!(model.version(), 1);
        assert_eq!(model.state(), &EngineState::Subscribed);
    }

    #[test]
    fn set_publishes_old_and_new_value() {
        let mut model = person(ModelOptions::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        model.subscribe("last_name", move |event| {
            sink.lock().unwrap().push(event.clone());
        });

        model.set("last_name", "C").unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].value, json!("C"));
        assert_eq!(seen[0].old_value, Some(json!("B")));
    }

    #[test]
    fn dotted_set_publishes_top_level_property() {
        let mut model = person(ModelOptions::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        model.subscribe_all(move |event| {
            sink.lock().unwrap().push((event.property.clone(), event.path.clone()));
        });

        model.set("address.city", "Paris").unwrap();

        assert_eq!(model.get("address.city").unwrap(), json!("Paris"));
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[("address".to_string(), "address.city".to_string())]
        );
    }

    #[test]
    fn disposed_model_rejects_writes_and_stops_recomputing() {
        let mut model = person(ModelOptions::default());
        model.dispose();

        assert!(matches!(model.set("first_name", "Z"), Err(ModelError::Disposed)));
        assert_eq!(model.get("full_name").unwrap(), json!("A B"));
        assert_eq!(model.state(), &EngineState::Disposed);
    }

    #[test]
    fn merge_rejects_non_objects() {
        let mut model = person(ModelOptions::default());
        let err = model.merge(&json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "expected a JSON object, got array");
    }

    #[test]
    fn unsubscribed_listener_is_silent() {
        let mut model = person(ModelOptions::default());
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        let id = model.subscribe("first_name", move |_| *sink.lock().unwrap() += 1);

        assert!(model.unsubscribe(id));
        model.set("first_name", "Z").unwrap();
        assert_eq!(*seen.lock().unwrap(), 0);
    }
}
