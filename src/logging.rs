//! Tracing subscriber setup for the binary and the tests.

use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Filter precedence: `SUITE_LOG`, then `RUST_LOG`, then `info`.
fn filter_directive(suite_log: Option<String>, rust_log: Option<String>) -> String {
    suite_log.or(rust_log).unwrap_or_else(|| "info".to_string())
}

fn env_filter() -> EnvFilter {
    EnvFilter::new(filter_directive(
        std::env::var("SUITE_LOG").ok(),
        std::env::var("RUST_LOG").ok(),
    ))
}

/// Installs the fmt subscriber writing to stderr, so logs stay apart from the
/// run's report. Only the first call in a process has any effect.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
    });
}

/// Like [`init`], but writes through the test harness so output is captured
/// per test. Safe to call from tests running in parallel.
pub fn init_for_tests() {
    INITIALIZED.get_or_init(|| {
        fmt()
            .with_env_filter(env_filter())
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
