//! Logging setup for the `digitnet` binary and anyone embedding the library.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a global `tracing` subscriber that writes to stderr.
///
/// `RUST_LOG`, when set, overrides `level`. Calling this a second time is a
/// no-op.
pub fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok();
}

/// Maps a `-v` repeat count to a filter level.
pub fn verbosity_level(count: u8) -> &'static str {
    match count {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_steps_up() {
        assert_eq!(verbosity_level(0), "info");
        assert_eq!(verbosity_level(1), "debug");
        assert_eq!(verbosity_level(7), "trace");
    }

    #[test]
    fn repeated_setup_is_harmless() {
        setup_logging("warn");
        setup_logging("debug");
        tracing::info!("still fine");
    }
}
