//! Error types for WebDAV session operations.

use http::StatusCode;

/// Errors surfaced by session operations.
///
/// Argument errors (`InvalidUri`) are rejected before any network call.
/// Protocol and malformed-response errors carry enough context to tell what
/// the server actually returned. Teardown never reports errors; unlock
/// failures during `close` are logged and swallowed.
#[derive(Debug, thiserror::Error)]
pub enum DavError {
    #[error("invalid URI: {0}")]
    InvalidUri(String),

    #[error("unexpected status for {operation}: expected {expected}, got {actual}")]
    UnexpectedStatus {
        operation: &'static str,
        expected: &'static str,
        actual: StatusCode,
    },

    #[error("malformed property value: {0}")]
    MalformedProperty(String),

    #[error("XML decode error: {0}")]
    Xml(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

impl DavError {
    /// Wrap a transport-level failure (connection, TLS, body transfer).
    pub fn transport(source: impl std::fmt::Display) -> Self {
        DavError::Transport(source.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DavError>;
