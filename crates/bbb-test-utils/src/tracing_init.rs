//! Tracing setup for test binaries.

use common::config::{ObservabilityConfig, DEFAULT_LOG_FILTER};
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: OnceLock<()> = OnceLock::new();

/// Install a test-writer subscriber once per test binary.
///
/// The filter comes from `RUST_LOG` (or `LOG_LEVEL`) and `LOG_JSON` switches
/// to JSON output. Safe to call from every test.
pub fn init_test_tracing() {
    INIT.get_or_init(|| {
        let config = ObservabilityConfig::from_env();
        let filter = EnvFilter::try_new(&config.log_level)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
        let registry = tracing_subscriber::registry().with(filter);

        // Another subscriber may already be installed by the harness.
        let _ = if config.json_logs {
            registry
                .with(fmt::layer().json().with_test_writer())
                .try_init()
        } else {
            registry.with(fmt::layer().with_test_writer()).try_init()
        };
    });
}
