use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

/// Environment variable holding the log filter directive.
pub const LOG_FILTER_ENV: &str = "TERMREQ_LOG";

/// Returns the path to the log file.
/// Location: `~/.local/share/termreq/termreq.log` (XDG-compliant)
pub fn log_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "termreq").context("Could not determine data directory")?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("termreq.log"))
}

/// Install a global subscriber appending to the log file.
/// The terminal belongs to the UI, so nothing is written to stdout/stderr.
pub fn init_logging() -> Result<PathBuf> {
    let path = log_path()?;
    init_logging_at(&path)?;
    Ok(path)
}

/// Install the global subscriber appending to `path`.
pub fn init_logging_at(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file at {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::rfc_3339())
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    info!(path = %path.display(), "logging started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_writes_startup_line() {
        let path = std::env::temp_dir().join(format!("termreq-test-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        init_logging_at(&path).unwrap();
        tracing::warn!("after init");

        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(contents.contains("logging started"));
        assert!(contents.contains("after init"));
        assert!(!contents.contains('\u{1b}'), "log file must not contain ANSI escapes");
    }
}
