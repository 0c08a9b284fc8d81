//! Error types for the deadlines loader.

/// Errors that can occur while loading or watching a deadlines file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parse/deserialization error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A decoded deadline failed validation (e.g. unknown threshold type).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The configured file type is neither YAML nor JSON.
    #[error("unknown deadlines file type '{0}' (expected yaml or json)")]
    UnknownFormat(String),

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Result alias for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;
