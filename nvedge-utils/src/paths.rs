//! Path utilities for nvedge
//!
//! Only the state directory is used, for the optional log file.

use std::path::PathBuf;
use directories::ProjectDirs;

/// Application identifier for XDG directories
const APP_NAME: &str = "nvedge";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// Get the state directory
///
/// Location: `$XDG_STATE_HOME/nvedge` or `~/.local/state/nvedge`
pub fn state_dir() -> PathBuf {
    project_dirs()
        .and_then(|p| p.state_dir().map(|d| d.to_path_buf()))
        .unwrap_or_else(fallback_state_dir)
}

/// Get the log directory
pub fn log_dir() -> PathBuf {
    state_dir().join("log")
}

/// Get the log file path
pub fn log_file() -> PathBuf {
    log_dir().join("nvedge.log")
}

fn fallback_state_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local").join("state").join(APP_NAME),
        None => std::env::temp_dir().join(APP_NAME),
    }
}
