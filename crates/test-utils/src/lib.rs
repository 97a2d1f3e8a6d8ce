//! Shared fixtures for the postdeploy integration tests: settings and
//! invocation builders, fake importers and shader compilers, and a fake
//! batch backend for driving the runtime without a worker pool.

pub mod builders;
pub mod fake_backend;
pub mod fakes;

use std::sync::Once;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Route daemon tracing into the test harness's captured output.
///
/// Runtime tests are the noisy ones (every event and batch is traced at
/// debug); `RUST_LOG=postdeploy=debug` shows them for a failing test.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Longest a runtime test may wait on the daemon. Generous next to the
/// debounce intervals the tests configure.
pub const RUNTIME_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Await `f`, failing the test if the runtime stalls.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(RUNTIME_TEST_TIMEOUT, f)
        .await
        .expect("runtime did not finish within the test timeout")
}
