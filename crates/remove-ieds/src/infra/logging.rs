//! Tracing subscriber setup.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing::Level;

use crate::infra::config::Logging;

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error, for non-interactive commands.
    Stderr,
    /// A file, for the terminal UI which owns the screen.
    File(PathBuf),
}

impl LogTarget {
    /// Target for the terminal UI: the configured file or the default log location.
    pub fn for_tui(config: &Logging) -> Self {
        match &config.file {
            Some(path) => Self::File(path.clone()),
            None => Self::File(default_log_file()),
        }
    }

    /// Target for command-line runs: the configured file, else stderr.
    pub fn for_cli(config: &Logging) -> Self {
        config
            .file
            .clone()
            .map(Self::File)
            .unwrap_or(Self::Stderr)
    }
}

/// Parse a level name, falling back to `info` for unknown values.
pub fn parse_level(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(Level::INFO)
}

/// Install the global fmt subscriber.
pub fn init(level: Level, target: &LogTarget) -> Result<()> {
    match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|err| anyhow!(err))?,
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|err| anyhow!(err))?
        }
    }
    Ok(())
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

fn default_log_file() -> PathBuf {
    dirs_next::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("remove-ieds")
        .join("remove-ieds.log")
}
