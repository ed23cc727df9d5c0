#![allow(dead_code)]

pub mod people;

use std::time::Duration;

use schema_model::{Check, CheckError, Violation};

/// Install a test subscriber once; `RUST_LOG` controls the output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Constraint that settles after `delay_ms` and fails with `tag`.
pub fn failing_after(tag: &'static str, delay_ms: u64) -> Check {
    Check::new(move |_, _| async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Err::<(), _>(CheckError::from(Violation::constraint(tag)))
    })
}

/// Constraint that settles after `delay_ms` and passes.
pub fn passing_after(delay_ms: u64) -> Check {
    Check::new(move |_, _| async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok::<(), CheckError>(())
    })
}
