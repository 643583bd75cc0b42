//! Error types for nvedge
//!
//! Provides a unified error type used across all nvedge crates. A blocked
//! move is not an error; see `Outcome` in the nvedge binary.

use std::path::PathBuf;

/// Exit status for every error
pub const ERROR_EXIT_CODE: i32 = 2;

/// Main error type for nvedge operations
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    // === Usage Errors ===

    #[error("{0}")]
    Usage(String),

    // === Connection Errors ===

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Editor not running at {path}")]
    EditorNotRunning { path: PathBuf },

    #[error("Connection timeout after {millis}ms")]
    ConnectionTimeout { millis: u64 },

    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    // === Protocol Errors ===

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    // === Batch Errors ===

    #[error("Batch failed: {0}")]
    Batch(String),

    #[error("Batch rejected at query {index} (type {kind}): {message}")]
    BatchRejected {
        index: usize,
        kind: i64,
        message: String,
    },

    // === Cancellation ===

    #[error("Deadline exceeded after {millis}ms")]
    DeadlineExceeded { millis: u64 },

    #[error("Cancelled")]
    Cancelled,

    // === Configuration Errors ===

    #[error("Configuration error: {0}")]
    Config(String),

    // === Internal Errors ===

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`NavError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Connection,
    Batch,
    Cancelled,
    Internal,
}

impl NavError {
    /// Create a usage error
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a batch error
    pub fn batch(msg: impl Into<String>) -> Self {
        Self::Batch(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Usage(_) => ErrorKind::Usage,
            Self::Connection(_)
            | Self::EditorNotRunning { .. }
            | Self::ConnectionTimeout { .. }
            | Self::ConnectionClosed
            | Self::Protocol(_)
            | Self::InvalidMessage(_) => ErrorKind::Connection,
            Self::Batch(_) | Self::BatchRejected { .. } => ErrorKind::Batch,
            Self::DeadlineExceeded { .. } | Self::Cancelled => ErrorKind::Cancelled,
            Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        ERROR_EXIT_CODE
    }
}

/// Result type alias using NavError
pub type Result<T> = std::result::Result<T, NavError>;
