mod case;
mod computed;
mod emitter;
mod error;
mod filter;
mod model;
mod options;
mod schema;
mod storage;
mod validation;

pub use case::{CaseConverter, HeckCaseConverter, NameStrategy, UnknownStrategy};
pub use computed::{ComputedEngine, EngineState};
#[cfg(feature = "emitter")]
pub use emitter::ModelEmitter;
pub use emitter::{ChangeChannel, ChangeEvent, Listener, SubscriptionId};
pub use error::{BoxError, ModelError};
pub use filter::{builtin, Filter, FilterError, FilterFn, FilterRegistry, FilterSettings};
pub use model::{
    DeclaredModel, Model, ModelBuilder, ModelFactory, SetOutcome, Values, ValuesMut,
};
pub use options::ModelOptions;
pub use schema::{
    check_computed_graph, extract_defaults, DefaultValue, JsonRules, PropertyDescriptor, Schema,
};
pub use storage::{
    top_segment, DottedPath, PathAccessor, Storage, INITIAL_VERSION, MAX_INDEX_GAP,
};
pub use validation::{
    required, Check, CheckContext, CheckError, CheckFuture, Constraint, FailureKind,
    InlineRunner, TaskRunner, ValidationFailure, ValidationPlan, Validator, Violation,
    DEFAULT_GROUP, DEFAULT_STATUS_CODE,
};

// Derive macro for type-level schemas
pub use schema_model_macros::DeclaredModel;

// Re-exported for code generated by the derive macro
pub use serde_json;
