//! Error types for source construction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building the source registry.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Two sources were configured with the same name.
    #[error("duplicate source name: {0}")]
    DuplicateName(String),

    /// A configured source root does not exist or is not a directory.
    #[error("source root is not a directory: {0}")]
    BadRoot(PathBuf),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
