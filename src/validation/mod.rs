//! Validation - asynchronous, grouped checks and their aggregation.
//!
//! Constraints check one property value; validators check the serialized
//! model. A check succeeds by returning `Ok(())`, fails by returning a
//! [`Violation`], and faults with anything else. A [`ValidationPlan`] runs all
//! scheduled checks concurrently and reports failures in scheduling order.
//!
//! ## Example
//!
//! ```ignore
//! use schema_model::{Constraint, Violation};
//!
//! let adult = Constraint::new(|value, _ctx| async move {
//!     match value.as_i64() {
//!         Some(age) if age >= 18 => Ok(()),
//!         _ => Err(Violation::constraint("adult").into()),
//!     }
//! })
//! .groups(["signup"]);
//! ```

mod check;
mod constraints;
mod failure;
mod pipeline;
mod runner;

pub use check::{Check, CheckContext, CheckError, CheckFuture, Constraint, Validator, Violation};
pub use constraints::required;
pub use failure::{FailureKind, ValidationFailure, DEFAULT_STATUS_CODE};
pub use pipeline::ValidationPlan;
pub use runner::{InlineRunner, TaskRunner};

/// Group every check applies to.
pub const DEFAULT_GROUP: &str = "default";
