//! Logging setup for the CLI.
//!
//! Events go to stderr in compact form. With a log directory, the same
//! events are also written to `catsdoc.log` there, without colours.
//! `RUST_LOG` overrides the default filter unless `-v` is given.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Name of the log file written into the log directory.
pub const LOG_FILE: &str = "catsdoc.log";

/// Initialise the global subscriber. Call once, before any logging.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("catsdoc=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catsdoc=info"))
    };

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory: {}", dir.display()))?;
            let path = dir.join(LOG_FILE);
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to initialise logging")
}
