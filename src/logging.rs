//! Diagnostic logging setup

use std::env;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable overriding the log filter
pub const LOG_ENV: &str = "FIGVAULT_LOG";

/// Filter directive for a `-v` count
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber writing human-readable lines to stderr.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger(verbosity: u8) {
    let filter = env::var(LOG_ENV).unwrap_or_else(|_| default_filter(verbosity).to_string());
    let filter_layer = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter_layer)
        .try_init();
}
