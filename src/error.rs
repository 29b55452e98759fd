//! Error types and handling.

use thiserror::Error;

use crate::ft12::FrameError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram encode/decode failed
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Socket I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Peer closed the connection mid-read
    #[error("connection closed")]
    ConnectionClosed,

    /// Connect or send/receive gave up
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// No reply within the configured window
    #[error("timeout: {0}")]
    Timeout(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a connection error with message
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed(msg.into())
    }

    /// Create a timeout error with message
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }
}
