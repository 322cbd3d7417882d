//! Logging initialization for modalflow.
//!
//! In TUI mode log output would corrupt the terminal, so records go to a
//! timestamped file under the configured state directory
//! (`.modalflow/logs/modalflow-{datetime}.log`). CLI mode logs to stderr.

use anyhow::Result;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Result of logging initialization
pub struct LoggingHandle {
    /// Guard that must be kept alive for the duration of the program.
    /// When dropped, ensures all buffered logs are flushed.
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file (only set in TUI mode with file logging enabled)
    pub log_file_path: Option<PathBuf>,
}

/// Logs directory and timestamped filename for this session's log file
fn file_destination(config: &Config) -> (PathBuf, String) {
    let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    (config.logs_path(), format!("modalflow-{timestamp}.log"))
}

/// Initialize logging based on mode and configuration.
///
/// `debug_override` forces the level filter to "debug" regardless of the
/// configured level (from the `--debug` flag). `RUST_LOG` overrides both.
///
/// Returns a `LoggingHandle` that must be kept alive for the duration of
/// the program.
pub fn init_logging(
    config: &Config,
    is_tui_mode: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let log_level = if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };

    let filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or(log_level));

    if is_tui_mode && config.logging.to_file {
        let (logs_dir, log_filename) = file_destination(config);
        std::fs::create_dir_all(&logs_dir)?;
        let log_file_path = logs_dir.join(&log_filename);

        let file_appender = tracing_appender::rolling::never(&logs_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false) // No ANSI codes in log files
                    .with_writer(non_blocking),
            )
            .init();

        Ok(LoggingHandle {
            _guard: Some(guard),
            log_file_path: Some(log_file_path),
        })
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();

        Ok(LoggingHandle {
            _guard: None,
            log_file_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();
        config
    }

    #[test]
    fn test_file_destination_under_state_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let (logs_dir, filename) = file_destination(&config);

        assert_eq!(logs_dir, temp_dir.path().join("logs"));
        assert!(filename.starts_with("modalflow-"));
        assert!(filename.ends_with(".log"));
    }

    // The global tracing subscriber can only be installed once per process,
    // so exactly one test here may call init_logging.
    #[test]
    fn test_stderr_mode_returns_handle_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let handle = init_logging(&config, false, false).unwrap();

        assert!(handle._guard.is_none());
        assert!(handle.log_file_path.is_none());
        // Nothing was written into the state directory
        assert!(!config.logs_path().exists());
    }
}
