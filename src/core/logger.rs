//! Logging setup and user-facing progress messages

use colored::Colorize;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` with `--verbose`
/// and `warn` without it. Everything goes to stderr so stdout stays clean.
pub fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}

/// Progress messages printed to stderr unless quiet
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    quiet: bool,
    color: bool,
}

impl Progress {
    pub fn new(quiet: bool, color: bool) -> Self {
        Self { quiet, color }
    }

    pub fn status(&self, message: impl std::fmt::Display) {
        if self.quiet {
            return;
        }
        let message = message.to_string();
        if self.color {
            eprintln!("{}", message.cyan());
        } else {
            eprintln!("{}", message);
        }
    }
}
