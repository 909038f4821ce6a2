//! Tracing subscriber setup.
//!
//! The filter comes from `TREEMARK_LOG` (same syntax as `RUST_LOG`). Without
//! it, `--verbose` enables `debug` for this crate and everything else stays
//! at `warn`. Logs go to stderr so they never mix with command output.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "TREEMARK_LOG";

/// Filter used when `TREEMARK_LOG` is not set.
#[must_use]
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "warn,treemark=debug" } else { "warn" }
}

/// Install the global subscriber.
///
/// Calling it again after a subscriber is installed is a no-op.
///
/// # Errors
///
/// Returns an error if the filter directive in `TREEMARK_LOG` cannot be parsed.
pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter_layer = match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(directive)?,
        Err(_) => EnvFilter::try_new(default_directive(verbose))?,
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    // A second init (tests, embedders) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();

    Ok(())
}
