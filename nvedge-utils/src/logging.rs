//! Logging infrastructure for nvedge
//!
//! Provides unified logging setup using the tracing ecosystem. The binary
//! runs from a keybinding, so logs stay quiet unless `NVEDGE_LOG` asks for
//! more, and can be sent to a file where stderr is not visible.

use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{paths, NavError, Result};

/// Env var holding the log filter
pub const LOG_FILTER_ENV: &str = "NVEDGE_LOG";

/// Env var selecting the log destination (`stderr` or `file`)
pub const LOG_OUTPUT_ENV: &str = "NVEDGE_LOG_OUTPUT";

/// Log output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Log to stderr
    Stderr,
    /// Append to the log file in the state directory
    File,
}

impl LogOutput {
    fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            _ => Self::Stderr,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output destination
    pub output: LogOutput,
    /// Log level filter (e.g., "warn", "nvedge=debug")
    pub filter: String,
    /// Include file/line in logs
    pub file_line: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output: LogOutput::Stderr,
            filter: "warn".into(),
            file_line: false,
        }
    }
}

impl LogConfig {
    /// Create config for the CLI from `NVEDGE_LOG` and `NVEDGE_LOG_OUTPUT`
    pub fn client() -> Self {
        Self::from_vars(
            std::env::var(LOG_FILTER_ENV).ok(),
            std::env::var(LOG_OUTPUT_ENV).ok(),
        )
    }

    fn from_vars(filter: Option<String>, output: Option<String>) -> Self {
        let output = output
            .as_deref()
            .map(LogOutput::from_env_value)
            .unwrap_or(LogOutput::Stderr);

        Self {
            output,
            filter: filter
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| "warn".into()),
            file_line: output == LogOutput::File,
        }
    }
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(config: LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| NavError::config(format!("Invalid log filter: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_file(config.file_line)
        .with_line_number(config.file_line);

    match config.output {
        LogOutput::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer.with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| NavError::internal(format!("Failed to init logging: {}", e)))?;
        }
        LogOutput::File => {
            let file = open_log_file(&paths::log_file())?;

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer.with_writer(Mutex::new(file)).with_ansi(false))
                .try_init()
                .map_err(|e| NavError::internal(format!("Failed to init logging: {}", e)))?;
        }
    }

    Ok(())
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| {
            NavError::config(format!("Failed to create {}: {}", dir.display(), e))
        })?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| NavError::config(format!("Failed to open {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.output, LogOutput::Stderr);
        assert_eq!(config.filter, "warn");
    }

    #[test]
    fn test_from_vars_unset() {
        let config = LogConfig::from_vars(None, None);
        assert_eq!(config.output, LogOutput::Stderr);
        assert_eq!(config.filter, "warn");
        assert!(!config.file_line);
    }

    #[test]
    fn test_from_vars_file_output() {
        let config = LogConfig::from_vars(Some("nvedge=debug".into()), Some("FILE".into()));
        assert_eq!(config.output, LogOutput::File);
        assert_eq!(config.filter, "nvedge=debug");
        assert!(config.file_line);
    }

    #[test]
    fn test_from_vars_blank_filter_falls_back() {
        let config = LogConfig::from_vars(Some("  ".into()), Some("bogus".into()));
        assert_eq!(config.filter, "warn");
        assert_eq!(config.output, LogOutput::Stderr);
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("nvedge.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
