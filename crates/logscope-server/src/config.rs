//! The JSON configuration document.

use std::path::Path;
use std::time::Duration;

use logscope_engine::EngineConfig;
use logscope_parse::ParserConfig;
use logscope_source::SourceConfig;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Engine limits as they appear in the configuration file. Durations are
/// milliseconds; absent fields keep the engine defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Flush threshold by line count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_batch_size: Option<usize>,
    /// Flush threshold by wall time, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_batch_time_ms: Option<u64>,
    /// Per-file cap on matched lines during search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_max_size: Option<usize>,
    /// Tree cache entry TTL in milliseconds; zero disables the cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_expiration_ms: Option<u64>,
    /// File extensions (with the leading dot) skipped during walks.
    #[serde(default)]
    pub exclude_extensions: Vec<String>,
    /// Directory basenames pruned during walks.
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
}

impl GlobalConfig {
    /// Resolves the file values against the engine defaults.
    #[must_use]
    pub fn to_engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            content_batch_size: self.content_batch_size.unwrap_or(defaults.content_batch_size),
            content_batch_time: self
                .content_batch_time_ms
                .map_or(defaults.content_batch_time, Duration::from_millis),
            search_max_size: self.search_max_size.unwrap_or(defaults.search_max_size),
            cache_expiration: self
                .cache_expiration_ms
                .map_or(defaults.cache_expiration, Duration::from_millis),
            exclude_extensions: self.exclude_extensions.clone(),
            exclude_dirs: self.exclude_dirs.clone(),
        }
    }
}

/// The full configuration document loaded at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerFileConfig {
    /// Engine limits.
    #[serde(default)]
    pub global: GlobalConfig,
    /// Source backends.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    /// Parser selection.
    #[serde(default)]
    pub parsers: Vec<ParserConfig>,
}

impl ServerFileConfig {
    /// Loads the document from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}
