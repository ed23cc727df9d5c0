use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde_json::{Map, Value};
use thiserror::Error;

use super::{FailureKind, DEFAULT_GROUP};
use crate::error::BoxError;

/// Future returned by a check invocation.
pub type CheckFuture = BoxFuture<'static, Result<(), CheckError>>;

type CheckFn = Arc<dyn Fn(Value, CheckContext) -> CheckFuture + Send + Sync>;

/// What a check is told about its invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckContext {
    /// Checked property, `None` for whole-model validators.
    pub property: Option<String>,
    /// Active validation group.
    pub group: String,
}

/// A recognizable validation failure raised by a check.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub kind: FailureKind,
    pub tag: String,
    pub property_value: Option<Value>,
    pub props: Option<Map<String, Value>>,
    pub status_code: Option<u16>,
    pub message: Option<String>,
}

impl Violation {
    /// Per-property failure.
    pub fn constraint(tag: impl Into<String>) -> Self {
        Violation {
            kind: FailureKind::Constraint,
            tag: tag.into(),
            property_value: None,
            props: None,
            status_code: None,
            message: None,
        }
    }

    /// Whole-model failure carrying the offending properties.
    pub fn validator(tag: impl Into<String>, props: Map<String, Value>) -> Self {
        Violation {
            kind: FailureKind::Validator,
            tag: tag.into(),
            property_value: None,
            props: Some(props),
            status_code: None,
            message: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.property_value = Some(value);
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Outcome of a failed check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Folded into the validation result.
    #[error("validation failed: {}", .0.tag)]
    Invalid(Violation),
    /// Aborts the whole validation call.
    #[error("check faulted: {0}")]
    Fault(BoxError),
}

impl CheckError {
    pub fn fault(error: impl Into<BoxError>) -> Self {
        CheckError::Fault(error.into())
    }
}

impl From<Violation> for CheckError {
    fn from(violation: Violation) -> Self {
        CheckError::Invalid(violation)
    }
}

/// An asynchronous constraint or validator with its applicability groups.
#[derive(Clone)]
pub struct Check {
    groups: Vec<String>,
    run: CheckFn,
}

/// Per-property check.
pub type Constraint = Check;

/// Whole-model check, receives the serialized model.
pub type Validator = Check;

impl Check {
    pub fn new<F, Fut>(check: F) -> Self
    where
        F: Fn(Value, CheckContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CheckError>> + Send + 'static,
    {
        Check {
            groups: Vec::new(),
            run: Arc::new(move |value, context| check(value, context).boxed()),
        }
    }

    /// Check that settles immediately.
    pub fn sync<F>(check: F) -> Self
    where
        F: Fn(&Value, &CheckContext) -> Result<(), CheckError> + Send + Sync + 'static,
    {
        Self::new(move |value, context| future::ready(check(&value, &context)))
    }

    /// Restrict the check to the given groups.
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn group_list(&self) -> &[String] {
        &self.groups
    }

    /// Whether the check runs under `group`.
    pub fn applies_to(&self, group: &str) -> bool {
        group == DEFAULT_GROUP || self.groups.is_empty() || self.groups.iter().any(|g| g == group)
    }

    pub(crate) fn invoke(&self, value: Value, context: CheckContext) -> CheckFuture {
        (self.run)(value, context)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check").field("groups", &self.groups).finish()
    }
}
