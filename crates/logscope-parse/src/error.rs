//! Error types for parser construction.

use thiserror::Error;

/// Errors that can occur while building the parser registry.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A parser's path pattern failed to compile.
    #[error("bad parser pattern {pattern:?}: {source}")]
    BadPattern {
        /// The offending pattern from the configuration.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParseError>;
