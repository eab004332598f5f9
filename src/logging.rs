//! `tracing` setup for the binary.
//!
//! Library code only emits events; installing a subscriber is left to the
//! process entry point. Output goes to stderr so it never mixes with the
//! CLI's stdout tables or `--json` output.

use std::io;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable consulted first for the log filter.
pub const LOG_ENV: &str = "SPOTLIB_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber.
///
/// The filter comes from `SPOTLIB_LOG`, then `RUST_LOG`, then defaults to
/// `warn`. Calling this twice is harmless; the second call reports the
/// failure as a string instead of panicking.
pub fn init() -> Result<(), String> {
    let filter = build_filter()?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

fn build_filter() -> Result<EnvFilter, String> {
    let directives = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    EnvFilter::try_new(&directives).map_err(|e| format!("Invalid log filter `{}`: {}", directives, e))
}
