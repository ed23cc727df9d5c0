//! Schema - declarative description of a model's properties.
//!
//! ## Example
//!
//! ```ignore
//! use schema_model::{required, Filter, PropertyDescriptor, Schema};
//!
//! let schema = Schema::new()
//!     .property("first_name", PropertyDescriptor::new().filter("string").value("A"))
//!     .property("last_name", PropertyDescriptor::new().filter("string").value("B"))
//!     .property(
//!         "full_name",
//!         PropertyDescriptor::new()
//!             .computed(["first_name", "last_name"])
//!             .filter(Filter::map(|deps| join(deps))),
//!     )
//!     .property("email", PropertyDescriptor::new().constraint(required(["signup"])));
//! ```

mod interpreter;

pub use interpreter::{check_computed_graph, extract_defaults};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::filter::Filter;
use crate::validation::{Constraint, DEFAULT_GROUP};

/// Initial value of a property.
#[derive(Clone)]
pub enum DefaultValue {
    Literal(Value),
    /// Called once per model construction.
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Producer(produce) => produce(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            DefaultValue::Producer(_) => write!(f, "Producer(..)"),
        }
    }
}

/// Serialization visibility of a property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonRules {
    pub hidden: bool,
    pub groups: Vec<String>,
}

impl JsonRules {
    /// Whether the property is serialized under `group`.
    pub fn visible_in(&self, group: &str) -> bool {
        !self.hidden
            && (self.groups.is_empty()
                || group == DEFAULT_GROUP
                || self.groups.iter().any(|g| g == group))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    default: Option<DefaultValue>,
    filter: Filter,
    constraints: Vec<Constraint>,
    validate: Option<Constraint>,
    computed: Vec<String>,
    json: JsonRules,
}

impl PropertyDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Literal default value.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Literal(value.into()));
        self
    }

    /// Default produced freshly for every model instance.
    pub fn value_with<F>(mut self, produce: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Producer(Arc::new(produce)));
        self
    }

    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// Single check run after all constraints.
    pub fn validate(mut self, check: Constraint) -> Self {
        self.validate = Some(check);
        self
    }

    /// Make the property computed from the given dependencies.
    pub fn computed<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.computed = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Never serialize the property.
    pub fn hidden(mut self) -> Self {
        self.json.hidden = true;
        self
    }

    /// Serialize only under these groups (and the default group).
    pub fn json_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.json.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn filter_spec(&self) -> &Filter {
        &self.filter
    }

    pub fn dependencies(&self) -> &[String] {
        &self.computed
    }

    pub fn is_computed(&self) -> bool {
        !self.computed.is_empty()
    }

    pub fn json(&self) -> &JsonRules {
        &self.json
    }

    /// Constraints followed by the `validate` check.
    pub fn checks(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().chain(self.validate.iter())
    }
}

/// Ordered property name to descriptor map.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    properties: Vec<(String, PropertyDescriptor)>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Schema::insert`].
    pub fn property(mut self, name: impl Into<String>, descriptor: PropertyDescriptor) -> Self {
        self.insert(name, descriptor);
        self
    }

    /// Declare a property. Redeclaring keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, descriptor: PropertyDescriptor) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&position) => self.properties[position].1 = descriptor,
            None => {
                self.index.insert(name.clone(), self.properties.len());
                self.properties.push((name, descriptor));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.index.get(name).map(|&position| &self.properties[position].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDescriptor)> {
        self.properties.iter().map(|(name, d)| (name.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn is_computed(&self, name: &str) -> bool {
        self.get(name).is_some_and(PropertyDescriptor::is_computed)
    }

    /// Ordered checks of a property: constraints, then `validate`.
    pub fn constraints_for(&self, name: &str) -> Vec<Constraint> {
        self.get(name)
            .map(|d| d.checks().cloned().collect())
            .unwrap_or_default()
    }

    /// Computed properties that list `name` as a dependency, in schema order.
    pub fn dependents_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter()
            .filter(move |(_, d)| d.dependencies().iter().any(|dep| dep == name))
            .map(|(prop, _)| prop)
    }

    /// Names of computed properties in schema order.
    pub fn computed_properties(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, d)| d.is_computed()).map(|(name, _)| name)
    }
}
