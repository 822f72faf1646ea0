//! # logscope-parse
//!
//! Log line parsers for the logscope server.
//!
//! This crate provides:
//!
//! - [`Log`] — A parsed log record with placement metadata
//! - [`ParserRegistry`] — Per-path parser selection with a raw fallback
//! - [`StructuredParser`] — Keyed JSON records with time formats and
//!   message argument interpolation
//! - [`ParserMemory`] — Per-file state for multi-line continuations
//!
//! A parser never fails outward: any line that cannot be decoded degrades
//! to a raw record carrying the line bytes as its message.

#![forbid(unsafe_code)]

pub mod error;
pub mod log;
pub mod registry;
pub mod structured;

pub use error::{ParseError, Result};
pub use log::Log;
pub use registry::{ParserConfig, ParserFormat, ParserRegistry};
pub use structured::{ParserMemory, StructuredParser};
