use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Name of the run log for a run started at `started`.
pub fn log_file_name(started: OffsetDateTime) -> anyhow::Result<String> {
    let stamp = started
        .format(format_description!("[year][month][day]_[hour][minute][second]"))
        .context("Failed to format log timestamp")?;
    Ok(format!("scraper_{}.log", stamp))
}

/// Install the process-wide subscriber: console on stderr plus a timestamped file in `log_dir`.
///
/// `RUST_LOG` overrides the level chosen from `verbose`. Returns the log file path.
pub fn init(log_dir: &Path, verbose: bool) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(log_dir).with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let started = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let path = log_dir.join(log_file_name(started)?);
    let file = File::create(&path).with_context(|| format!("Failed to create log file: {}", path.display()))?;

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("headliner={0},headliner_core={0},warn", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(path)
}
