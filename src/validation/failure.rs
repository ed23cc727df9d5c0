use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Violation;

/// Status code stamped on failures that do not set one.
pub const DEFAULT_STATUS_CODE: u16 = 422;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Raised by a per-property constraint.
    Constraint,
    /// Raised by a whole-model validator.
    Validator,
}

/// One failed check in a validation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
    pub tag: String,
    pub group: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationFailure {
    /// Stamp a violation with where and under which group it was raised.
    ///
    /// `checked` is the value the property check ran against and fills in a
    /// missing `property_value`.
    pub(crate) fn from_violation(
        violation: Violation,
        property: Option<String>,
        checked: Option<Value>,
        group: &str,
    ) -> Self {
        ValidationFailure {
            kind: violation.kind,
            property_value: violation.property_value.or(checked),
            property_name: property,
            props: violation.props,
            tag: violation.tag,
            group: group.to_string(),
            status_code: violation.status_code.unwrap_or(DEFAULT_STATUS_CODE),
            message: violation.message,
        }
    }
}
