use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{Blueprint, Model};
use crate::case::{CaseConverter, HeckCaseConverter};
use crate::error::ModelError;
use crate::filter::{FilterError, FilterRegistry, FilterSettings};
use crate::options::ModelOptions;
use crate::schema::{check_computed_graph, Schema};
use crate::storage::{DottedPath, PathAccessor};

/// Builds a [`Model`] with custom collaborators.
///
/// # Example
///
/// ```ignore
/// let model = Model::builder(schema)
///     .options(ModelOptions::default().strict(true))
///     .register_filter("slug", |value, _| Ok(slugify(value)))
///     .case_converter(|_: Option<&str>, name: &str| name.to_uppercase())
///     .build()?;
/// ```
pub struct ModelBuilder {
    schema: Schema,
    options: ModelOptions,
    filters: FilterRegistry,
    case_converter: Arc<dyn CaseConverter>,
    accessor: Arc<dyn PathAccessor>,
}

impl ModelBuilder {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            options: ModelOptions::default(),
            filters: FilterRegistry::new(),
            case_converter: Arc::new(HeckCaseConverter),
            accessor: Arc::new(DottedPath),
        }
    }

    pub fn options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the named-filter registry.
    pub fn filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = filters;
        self
    }

    pub fn register_filter<F>(mut self, name: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&Value, &FilterSettings) -> Result<Value, FilterError> + Send + Sync + 'static,
    {
        self.filters.register(name, filter);
        self
    }

    pub fn case_converter<C>(mut self, converter: C) -> Self
    where
        C: CaseConverter + 'static,
    {
        self.case_converter = Arc::new(converter);
        self
    }

    pub fn path_accessor<A>(mut self, accessor: A) -> Self
    where
        A: PathAccessor + 'static,
    {
        self.accessor = Arc::new(accessor);
        self
    }

    /// Resolve filters, check the computed graph and construct the model.
    pub fn build(self) -> Result<Model, ModelError> {
        check_computed_graph(&self.schema)?;

        let mut filters = HashMap::with_capacity(self.schema.len());
        for (property, descriptor) in self.schema.iter() {
            if descriptor.filter_spec().is_identity() {
                continue;
            }
            filters.insert(property.to_string(), self.filters.resolve(descriptor.filter_spec())?);
        }
        debug!(
            properties = self.schema.len(),
            filters = filters.len(),
            "model schema resolved"
        );

        let blueprint = Arc::new(Blueprint {
            schema: self.schema,
            filters,
            case_converter: self.case_converter,
            accessor: self.accessor,
        });
        Model::from_blueprint(blueprint, self.options)
    }
}
