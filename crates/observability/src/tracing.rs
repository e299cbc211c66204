//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Logs are JSON lines filtered via `RUST_LOG` (default `info`).
/// `LOG_FORMAT=pretty` switches to human-readable output for local runs
/// against the in-memory stores.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let pretty = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "pretty");
    let _ = if pretty {
        builder.pretty().try_init()
    } else {
        builder.json().try_init()
    };
}
