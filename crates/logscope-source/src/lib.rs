//! # logscope-source
//!
//! Filesystem source backends for the logscope server.
//!
//! This crate provides:
//!
//! - [`SourceFs`] — The capability a backend must expose (open, lstat,
//!   walk with a skip-dir signal, join)
//! - [`LocalFs`] — A root-confined local directory backend
//! - [`Source`] / [`Sources`] — Named backends and the frozen registry
//!
//! All paths crossing the trait boundary are source-relative and
//! slash-joined; the empty path denotes the source root. A backend never
//! serves anything outside its own root.

#![forbid(unsafe_code)]

pub mod error;
pub mod fs;
pub mod local;
pub mod registry;

pub use error::{Result, SourceError};
pub use fs::{FileStat, SourceFs, SourceWalker, WalkEntry};
pub use local::LocalFs;
pub use registry::{Source, SourceConfig, Sources};
