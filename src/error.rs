//! Error types for weektasks.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Storage backend I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure while writing the collection.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored blob exists but cannot be parsed.
    #[error("stored value under `{key}` is unreadable: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    /// A required task field was empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("no task with id {0}")]
    NotFound(u64),

    /// Terminal setup or drawing failed.
    #[error("terminal error: {0}")]
    Terminal(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TaskError>;
