//! # logscope-engine
//!
//! The concurrent fan-out request engine behind the logscope server.
//!
//! This crate provides:
//!
//! - [`Engine`] — Tree, content and search handlers fanning out one task
//!   per source
//! - [`run_connection`] — The per-connection dispatcher: preemption,
//!   cooperative cancellation, drain-on-shutdown
//! - The wire model ([`Request`], [`Response`], [`Meta`], [`File`], ...)
//! - [`EngineConfig`] — Batching, search and cache limits
//!
//! The engine is transport-independent: it reads [`Request`]s from an
//! inbound channel and emits [`Response`]s on an outbound channel. A
//! transport (see `logscope-server`) frames those over a WebSocket and
//! owns the single writer draining the outbound side.

#![forbid(unsafe_code)]

pub mod cache;
pub mod combiner;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod protocol;
pub mod reader;

pub use cache::TreeCache;
pub use combiner::TreeCombiner;
pub use config::EngineConfig;
pub use dispatch::run_connection;
pub use engine::Engine;
pub use protocol::{
    Action, File, FileInstance, Meta, Path, Request, Response, TimeRange,
};
