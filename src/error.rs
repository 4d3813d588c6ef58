//! # Error Types
//!
//! This module defines error types used throughout the missive crate.
//!
//! Markup parsing never fails: malformed or unknown tags degrade to text.
//! Everything else that touches the outside world (the queue file, the
//! printer device, submitted images) reports through [`MissiveError`].

use thiserror::Error;

/// Main error type for missive operations
#[derive(Debug, Error)]
pub enum MissiveError {
    /// Transport-level errors (device open, TTY setup, writes)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Queue store errors (lock acquisition, corrupt queue file)
    #[error("Store error: {0}")]
    Store(String),

    /// Image decoding or preparation error
    #[error("Image error: {0}")]
    Image(String),

    /// Invalid or unloadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Unknown or unreadable template
    #[error("Template error: {0}")]
    Template(String),

    /// Invalid printer command parameter
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
