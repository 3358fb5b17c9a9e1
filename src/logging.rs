//! Subscriber setup for the `nekos-dl` binary.
//!
//! Log lines go to stderr so stdout carries only download notices.

use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Map a `-v` count to the default filter
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "info,nekos_dl=debug",
        _ => "debug,nekos_dl=trace",
    }
}

/// Install the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `default`.
pub fn init_logging(default: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::config("logging", e.to_string()))?;

    tracing::debug!(filter = default, "logging initialized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_crate_level() {
        assert_eq!(default_directive(0), "info");
        assert!(default_directive(1).contains("nekos_dl=debug"));
        assert!(default_directive(5).contains("nekos_dl=trace"));
    }

    #[test]
    fn directives_parse() {
        for v in 0..3 {
            assert!(EnvFilter::try_new(default_directive(v)).is_ok());
        }
    }
}
