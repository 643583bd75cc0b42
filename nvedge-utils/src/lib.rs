//! nvedge-utils: Common utilities shared across nvedge crates
//!
//! This crate provides:
//! - Unified error types ([`NavError`], [`Result`])
//! - Logging infrastructure ([`init_logging_with_config`], [`LogConfig`])
//! - XDG-compliant path utilities ([`paths`] module)

pub mod error;
pub mod logging;
pub mod paths;

// Re-export main types at crate root for convenience
pub use error::{ErrorKind, NavError, Result};
pub use logging::{init_logging_with_config, LogConfig, LogOutput};
pub use paths::{log_dir, log_file, state_dir};
