use std::fs::{self, OpenOptions};

use anyhow::{Context, Result};

use crate::config::AppConfig;

/// Send log output to a file in the data directory. The terminal belongs to
/// the full-screen UI, so nothing may be written to stdout or stderr while it
/// runs.
pub fn init_logging(config: &AppConfig) -> Result<()> {
    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    env_logger::Builder::new()
        .filter_level(config.log_level)
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .try_init()
        .context("logger already initialised")?;

    Ok(())
}
