//! Logging setup.
//!
//! Installs a `tracing-subscriber` formatter with an `EnvFilter`. `RUST_LOG` takes
//! precedence over the configured level so operators can raise verbosity without
//! touching the bot configuration.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// Safe to call more than once: a restart re-runs the logger stage and the second
/// installation attempt is ignored.
///
/// # Arguments
/// - `default_level` - Filter directive used when `RUST_LOG` is not set, e.g. `info`
///
/// # Returns
/// - `true` - The subscriber was installed by this call
/// - `false` - A global subscriber was already installed
pub fn init(default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
}
