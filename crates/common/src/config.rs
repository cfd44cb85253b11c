//! Process-level configuration shared by the dev tools binaries.
//!
//! Domain values (host, credentials, resource kind) live in the
//! [`crate::store`]; this module only covers how the process itself behaves.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Environment variable holding the default tracing filter.
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

/// Environment variable that switches log output to JSON.
pub const LOG_JSON_VAR: &str = "ADDON_DEVTOOLS_LOG_JSON";

/// Observability configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing filter directive (e.g. `addon_devtools=debug`)
    pub log_filter: String,
    /// Enable JSON-formatted logs
    pub json_logs: bool,
}

impl ObservabilityConfig {
    /// Load from environment variables.
    #[must_use]
    pub fn from_env(default_filter: &str) -> Self {
        Self::from_vars(&std::env::vars().collect(), default_filter)
    }

    /// Load from a variable map (for testing).
    #[must_use]
    pub fn from_vars(vars: &HashMap<String, String>, default_filter: &str) -> Self {
        let log_filter = vars
            .get(LOG_FILTER_VAR)
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| default_filter.to_string());

        let json_logs = vars
            .get(LOG_JSON_VAR)
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        Self {
            log_filter,
            json_logs,
        }
    }
}
