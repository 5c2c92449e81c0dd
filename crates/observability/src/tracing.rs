//! Tracing subscriber configuration.

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber.
///
/// Filtering comes from `RUST_LOG` (default `info`). Output is JSON unless
/// `STOCKROUTE_LOG_FORMAT=compact` is set; JSON is what the log pipeline
/// ingests in deployment, compact is for a terminal.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let compact = std::env::var("STOCKROUTE_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("compact"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let _ = if compact {
        builder.compact().try_init()
    } else {
        builder.json().try_init()
    };
}
