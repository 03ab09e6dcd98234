//! Tracing setup for applications embedding the analyzer.
//!
//! The library only emits events; installing a subscriber is left to the
//! caller through [`init_logging`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::AnalysisError;

/// Install a stderr subscriber.
///
/// `verbosity` maps 0=error, 1=warn, 2=info, 3=debug, 4+=trace. `RUST_LOG`
/// takes precedence when set. Fails if a global subscriber is already installed.
pub fn init_logging(verbosity: u8) -> Result<(), AnalysisError> {
    let level = match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cursor_tune={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(verbosity >= 3)
                .with_line_number(verbosity >= 3),
        )
        .try_init()
        .map_err(|e| AnalysisError::Io(std::io::Error::other(e.to_string())))
}
