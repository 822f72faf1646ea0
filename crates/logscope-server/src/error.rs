//! Error types for the server.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors that can occur in the transport layer.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding the listen address failed.
    #[error("failed to bind {0}: {1}")]
    BindFailed(SocketAddr, #[source] std::io::Error),

    /// Reading or decoding the configuration file failed.
    #[error("bad configuration: {0}")]
    BadConfig(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Building the source registry failed.
    #[error("source registry: {0}")]
    Sources(#[from] logscope_source::SourceError),

    /// Building the parser registry failed.
    #[error("parser registry: {0}")]
    Parsers(#[from] logscope_parse::ParseError),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
