use serde_json::Value;

use super::{Model, ModelBuilder};
use crate::error::ModelError;
use crate::filter::FilterRegistry;
use crate::options::ModelOptions;
use crate::schema::Schema;

/// A model kind whose schema and settings belong to a type.
///
/// Usually derived with `#[derive(DeclaredModel)]`; the schema is resolved
/// again for each instance and frozen once the instance exists.
pub trait DeclaredModel {
    fn schema() -> Schema;

    fn options() -> ModelOptions {
        ModelOptions::default()
    }

    /// Named filters used by the schema.
    fn filters() -> FilterRegistry {
        FilterRegistry::new()
    }

    fn create() -> Result<Model, ModelError> {
        ModelBuilder::new(Self::schema())
            .options(Self::options())
            .filters(Self::filters())
            .build()
    }

    fn from_json(data: &Value) -> Result<Model, ModelError> {
        let mut model = Self::create()?;
        model.load_json(data)?;
        Ok(model)
    }
}
