//! # logscope-server
//!
//! WebSocket transport for the logscope request engine.
//!
//! This crate provides:
//!
//! - [`LogscopeServer`] — TCP accept loop with WebSocket upgrade
//! - Per-connection sessions framing [`Request`]/[`Response`] as JSON
//! - [`ServerFileConfig`] — The JSON configuration document
//!
//! [`Request`]: logscope_engine::Request
//! [`Response`]: logscope_engine::Response

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod server;
pub mod session;

pub use config::{GlobalConfig, ServerFileConfig};
pub use error::{Result, ServerError};
pub use server::LogscopeServer;
