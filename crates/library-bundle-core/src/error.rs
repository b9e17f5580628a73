//! Error types for library-bundle-core

use thiserror::Error;

/// Main error type for library export operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read/write ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read library: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("An export is already running")]
    ExportInProgress,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for library export operations
pub type Result<T> = std::result::Result<T, Error>;
