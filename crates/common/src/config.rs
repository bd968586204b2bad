//! Common configuration types for the fixture crates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default tracing filter when neither `RUST_LOG` nor `LOG_LEVEL` is set.
pub const DEFAULT_LOG_FILTER: &str = "bbb.fixtures=debug,bbb_fixtures=debug,bbb_test_utils=debug";

/// Observability configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing filter directive (e.g. "info" or "bbb_fixtures=trace")
    pub log_level: String,
    /// Enable JSON-formatted logs
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_FILTER.to_string(),
            json_logs: false,
        }
    }
}

impl ObservabilityConfig {
    /// Load from a variable map. `RUST_LOG` wins over `LOG_LEVEL`; `LOG_JSON`
    /// accepts `1`/`true`.
    #[must_use]
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let log_level = vars
            .get("RUST_LOG")
            .or_else(|| vars.get("LOG_LEVEL"))
            .cloned()
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let json_logs = vars
            .get("LOG_JSON")
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        Self {
            log_level,
            json_logs,
        }
    }

    /// Load from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(&std::env::vars().collect())
    }
}
