use super::{Constraint, Violation};
use crate::filter::builtin::truthy;

/// Fails with tag `"required"` when the value is falsy.
pub fn required<I, S>(groups: I) -> Constraint
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Constraint::sync(|value, _| {
        if truthy(value) {
            Ok(())
        } else {
            Err(Violation::constraint("required")
                .with_value(value.clone())
                .into())
        }
    })
    .groups(groups)
}
