//! Error types for host operations and editor configuration.
//!
//! Nothing here reaches the page: callers log host failures through
//! `tracing` and carry on, and malformed configuration degrades to defaults.

/// Failure reported by an [`EditingHost`](crate::EditingHost) operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The node is not attached where the operation needs it to be.
    #[error("node has no parent")]
    Detached,

    /// The host cannot perform the operation on the current selection.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// There is no selection range to act on.
    #[error("no selection range")]
    NoSelection,

    /// Error raised by the underlying document implementation.
    #[error("dom error: {0}")]
    Dom(String),
}

impl From<&str> for HostError {
    fn from(s: &str) -> Self {
        HostError::Dom(s.to_string())
    }
}

impl From<String> for HostError {
    fn from(s: String) -> Self {
        HostError::Dom(s)
    }
}

/// Editor configuration could not be read.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid editor config: {0}")]
    Json(#[from] serde_json::Error),
}
