use std::error::Error as StdError;

use thiserror::Error;

use crate::filter::FilterError;

/// Boxed error carried by faulted validation checks.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Structural and runtime errors raised by a [`Model`](crate::Model).
///
/// Validation failures are not errors: they come back from
/// [`Model::validate`](crate::Model::validate) as
/// [`ValidationFailure`](crate::ValidationFailure) values.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A filter identifier is neither built in nor registered.
    #[error("no filter defined with {name} name")]
    UnknownFilter { name: String },

    /// Strict-mode write to a property the schema does not declare.
    #[error("there is no such prop to set: {property}")]
    UnknownProperty { property: String },

    /// Direct write to a computed property.
    #[error("can't set computed value {property}")]
    ComputedPropertyWrite { property: String },

    /// The computed dependency graph loops back on itself.
    #[error("computed properties form a cycle: {}", .path.join(" -> "))]
    ComputedCycle { path: Vec<String> },

    /// A computed property's filter failed while recomputing.
    #[error("failed to compute {property}: {source}")]
    ComputeFailed {
        property: String,
        source: FilterError,
    },

    /// Recomputation stopped after an earlier failure.
    #[error("computed property {property} faulted, rebuild the model")]
    ComputedFaulted { property: String },

    /// A property filter failed while reading.
    #[error("filter for {property} failed: {source}")]
    Filter {
        property: String,
        source: FilterError,
    },

    /// A constraint or validator raised something other than a violation.
    #[error("validation check faulted: {0}")]
    PipelineFault(#[source] BoxError),

    #[error("unknown option {key}")]
    UnknownOption { key: String },

    #[error("invalid value for option {key}: {message}")]
    InvalidOption { key: String, message: String },

    /// Property accessor disabled by `use_getters`/`use_setters` or not declared.
    #[error("no accessor available for {property}")]
    AccessorUnavailable { property: String },

    #[error("model has been disposed")]
    Disposed,

    /// Model data must be a JSON object.
    #[error("expected a JSON object, got {found}")]
    NotAnObject { found: String },

    #[error("failed to decode model: {source}")]
    Decode { source: serde_json::Error },

    #[error("invalid model options: {0}")]
    Config(#[from] serde_json::Error),
}
