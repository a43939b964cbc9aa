//! Shared fixtures for the `jac` integration tests.

pub mod builders;
pub mod fake_backend;
pub mod sink;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use jac::logging::{LOG_ENV, build_filter};
use tracing_subscriber::fmt;

static INIT: Once = Once::new();

/// Upper bound for anything a test awaits through [`with_timeout`].
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a capturing subscriber once per test binary.
///
/// Filters the same way the binary does, so `JAC_LOG=jac::engine=debug`
/// works here too. Captured output is only shown for failing tests.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();
        let _ = fmt()
            .with_env_filter(build_filter(None, env.as_deref()))
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `fut`, failing the test if it is still pending after
/// [`TEST_TIMEOUT`].
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(output) => output,
        Err(_) => panic!("still pending after {TEST_TIMEOUT:?}"),
    }
}
