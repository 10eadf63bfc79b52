//! Error types for running a compilation.

use std::path::PathBuf;

/// Operational failures. Problems in the checked program are diagnostics, not errors.
#[derive(Debug, thiserror::Error)]
pub enum TesseraError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A source file does not parse.
    #[error("{file}: parse error: {message}")]
    Parse { file: String, message: String },

    /// An explicitly requested configuration file is unusable.
    #[error("invalid configuration {path}: {source}")]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A host diagnostic stream is not valid JSON.
    #[error("invalid host diagnostics {path}: {source}")]
    HostDiagnostics {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for compilation operations.
pub type TesseraResult<T> = Result<T, TesseraError>;
