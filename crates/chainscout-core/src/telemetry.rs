//! Tracing subscriber setup for chainscout binaries.
//!
//! [`init_tracing`] installs a global registry with an `EnvFilter` and either
//! human-readable or newline-delimited JSON output on stderr, leaving stdout
//! to command output. Only the first call in a process takes effect.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable selecting JSON output when set to `json`.
pub const LOG_FORMAT_ENV: &str = "CHAINSCOUT_LOG_FORMAT";

/// Default filter when `RUST_LOG` is unset: chainscout crates at `level`,
/// everything else at `warn`.
pub fn default_directives(level: Level) -> String {
    format!("warn,chainscout_core={level},chainscout={level}").to_lowercase()
}

/// Whether JSON output was requested, either by flag or via [`LOG_FORMAT_ENV`].
pub fn wants_json(flag: bool) -> bool {
    flag || std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` overrides [`default_directives`] when present.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if wants_json(json) {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false).json())
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
