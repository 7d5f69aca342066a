use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::domain::TVError;

const DEFAULT_FILTER: &str = "info";

/// Expands `~` and environment variables in a user supplied log path.
pub fn expand_log_path(path: &str) -> Result<PathBuf, TVError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| TVError::InvalidConfig(format!("can't expand log file path {path}: {e}")))
}

/// The terminal belongs to the UI, so log lines only go to a file when one is given.
pub fn init(log_file: Option<&str>) -> Result<(), TVError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(expand_log_path(path)?)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| TVError::InvalidConfig(format!("logging already initialized: {e}")))
}
