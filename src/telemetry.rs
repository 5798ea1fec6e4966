//! Telemetry and structured logging setup.
//!
//! Provides consistent logging across all components with:
//! - Structured output for log aggregation
//! - Configurable verbosity via RUST_LOG

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initializes telemetry, picking the output format from `LOG_FORMAT`
/// (`json` for aggregation pipelines, anything else for human-readable).
pub fn init_telemetry() {
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        init_json();
    } else {
        init_compact();
    }
}

/// Human-readable compact output.
///
/// Verbosity comes from RUST_LOG. Example values:
/// - `info` - All info and above
/// - `coincap_bot=debug` - Debug for our crate, default for others
/// - `coincap_bot=trace,tokio=warn` - Trace for us, warn for tokio
fn init_compact() {
    let subscriber = tracing_subscriber::registry()
        .with(default_filter())
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );

    subscriber.init();
}

/// JSON output for log aggregation.
fn init_json() {
    let subscriber = tracing_subscriber::registry()
        .with(default_filter())
        .with(fmt::layer().json().with_span_events(FmtSpan::CLOSE));

    subscriber.init();
}

fn default_filter() -> EnvFilter {
    // INFO for everything, DEBUG for our crate unless RUST_LOG says so
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,coincap_bot=debug"))
}
