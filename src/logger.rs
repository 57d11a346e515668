//! Logging setup on top of `tracing`.
//!
//! Output goes to stderr with no targets or timestamps, so log lines read
//! like plain progress messages. `RUST_LOG` overrides the level derived
//! from the command-line flags.

use std::io::IsTerminal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Maps `-v` count and `--quiet` onto a filter directive.
pub fn level_for(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

pub fn init(verbosity: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity, quiet)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_level(verbosity > 0)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0, false), "info");
        assert_eq!(level_for(1, false), "debug");
        assert_eq!(level_for(4, false), "trace");
        assert_eq!(level_for(2, true), "warn");
    }
}
