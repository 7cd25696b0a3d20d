//! Shared helpers for applink's integration tests.

pub mod builders;
pub mod fake_executor;
pub mod recording;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use applink::logging::LOG_ENV_VAR;
use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for any single async test step.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Reads the same `APPLINK_LOG` filter as the binary (falling back to
/// `RUST_LOG`, then `applink=info`), so scheduler decisions of a failing test
/// can be replayed with e.g. `APPLINK_LOG=applink::scheduler=debug`.
/// Output only shows for failing tests unless run with `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("applink=info"));

        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
///
/// Runtime loops that never settle show up here instead of hanging the
/// suite.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test step did not finish within {TEST_TIMEOUT:?}"),
    }
}
