//! Unified error types for Tidewatch.

use thiserror::Error;

/// Result type alias using TidewatchError.
pub type Result<T> = std::result::Result<T, TidewatchError>;

#[derive(Error, Debug)]
pub enum TidewatchError {
    // Feed errors: cycle level, the whole check cycle is skipped
    #[error("Feed unavailable: {0}")]
    Feed(String),

    // Store errors: subscriber level, isolated per record
    #[error("Store error: {0}")]
    Store(String),

    // Delivery errors: entry level, the notification is retried next cycle
    #[error("Channel error: {0}")]
    Channel(String),

    // Gateway errors
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    // Config errors: fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TidewatchError {
    pub fn feed(msg: impl Into<String>) -> Self {
        Self::Feed(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
