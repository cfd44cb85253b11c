//! Log filter setup.
//!
//! Library events use their own `target:` strings (`devtools.*`,
//! `common.store`) rather than module paths, so the default filter has to name
//! those prefixes or nothing but the binary's own lines gets through.

use common::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "addon_devtools=info,devtools=info,common=info";

/// Build the tracing filter for `observability`, falling back to
/// [`DEFAULT_LOG_FILTER`] when its directive does not parse.
pub fn env_filter(observability: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_new(&observability.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
