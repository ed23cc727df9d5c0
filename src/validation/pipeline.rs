use std::fmt;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::{Check, CheckContext, CheckError, CheckFuture, ValidationFailure};
use crate::error::ModelError;

struct ScheduledCheck {
    property: Option<String>,
    checked: Option<Value>,
    future: CheckFuture,
}

/// Checks scheduled for one validation call, in scheduling order.
///
/// A plan owns everything it needs, so it can be moved onto another task and
/// outlive the model that built it.
pub struct ValidationPlan {
    group: String,
    checks: Vec<ScheduledCheck>,
}

impl ValidationPlan {
    pub(crate) fn new(group: impl Into<String>) -> Self {
        ValidationPlan {
            group: group.into(),
            checks: Vec::new(),
        }
    }

    /// Schedule the property's checks that apply to the active group.
    pub(crate) fn schedule_property<'a, I>(&mut self, property: &str, value: &Value, checks: I)
    where
        I: IntoIterator<Item = &'a Check>,
    {
        for check in checks.into_iter().filter(|c| c.applies_to(&self.group)) {
            trace!(property, group = %self.group, "scheduling constraint");
            let context = CheckContext {
                property: Some(property.to_string()),
                group: self.group.clone(),
            };
            self.checks.push(ScheduledCheck {
                property: Some(property.to_string()),
                checked: Some(value.clone()),
                future: check.invoke(value.clone(), context),
            });
        }
    }

    /// Schedule whole-model validators against the serialized model.
    pub(crate) fn schedule_validators<'a, I>(&mut self, snapshot: &Value, validators: I)
    where
        I: IntoIterator<Item = &'a Check>,
    {
        for validator in validators.into_iter().filter(|v| v.applies_to(&self.group)) {
            trace!(group = %self.group, "scheduling validator");
            let context = CheckContext {
                property: None,
                group: self.group.clone(),
            };
            self.checks.push(ScheduledCheck {
                property: None,
                checked: None,
                future: validator.invoke(snapshot.clone(), context),
            });
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check concurrently and wait for all of them to settle.
    ///
    /// Failures come back in scheduling order. The first fault, in scheduling
    /// order, rejects the whole call.
    pub async fn run(self) -> Result<Vec<ValidationFailure>, ModelError> {
        let group = self.group;
        let (origins, futures): (Vec<_>, Vec<_>) = self
            .checks
            .into_iter()
            .map(|check| ((check.property, check.checked), check.future))
            .unzip();

        let outcomes = join_all(futures).await;

        let mut failures = Vec::new();
        for ((property, checked), outcome) in origins.into_iter().zip(outcomes) {
            match outcome {
                Ok(()) => {}
                Err(CheckError::Invalid(violation)) => failures.push(
                    ValidationFailure::from_violation(violation, property, checked, &group),
                ),
                Err(CheckError::Fault(fault)) => {
                    warn!(group = %group, property = ?property, error = %fault, "validation check faulted");
                    return Err(ModelError::PipelineFault(fault));
                }
            }
        }

        debug!(group = %group, failures = failures.len(), "validation settled");
        Ok(failures)
    }
}

impl fmt::Debug for ValidationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationPlan")
            .field("group", &self.group)
            .field("checks", &self.checks.len())
            .finish()
    }
}
