//! Logging initialization.
//!
//! The report is the only thing this binary writes to stdout, so callers can
//! pipe it straight into `jq` or a file. Every log line goes to stderr.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber with `level` as the filter directive.
///
/// An unparsable directive falls back to `warn` instead of failing the run.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("warn"))
        .context("failed to parse log level")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()
        .ok();

    Ok(())
}
