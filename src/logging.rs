//! Logging configuration using the tracing ecosystem.
//!
//! The terminal belongs to the UI, so all log output goes to a daily-rotated
//! file. Request diagnostics are separate: see `api::diagnostics`.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "lazylinear=info,warn";

/// Directory name under the platform data directory.
const APP_DIR: &str = "lazylinear";

/// File name of the request diagnostics log.
const DIAGNOSTICS_FILE: &str = "debug.log";

/// Initialize the logging system.
///
/// Logs go to `lazylinear/logs/` under the platform-specific local data
/// directory (`~/.local/share` on Linux). Levels come from `RUST_LOG`,
/// e.g. `RUST_LOG=lazylinear=debug`.
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created,
/// or if a global subscriber is already set.
pub fn init() -> anyhow::Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "lazylinear.log");

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "LazyLinear starting up");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join(APP_DIR).join("logs"))
}

/// Get the path where logs are stored.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}

/// Where the request diagnostics sink writes when debug mode is on.
pub fn diagnostics_path() -> Option<PathBuf> {
    log_directory().map(|dir| dir.join(DIAGNOSTICS_FILE))
}

/// Log application shutdown.
pub fn shutdown() {
    tracing::info!("LazyLinear shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_has_expected_structure() {
        let dir = get_log_directory().unwrap();
        assert!(dir.ends_with("lazylinear/logs"));
    }

    #[test]
    fn test_diagnostics_path_is_inside_log_directory() {
        let path = diagnostics_path().unwrap();
        assert!(path.ends_with("lazylinear/logs/debug.log"));
    }
}
