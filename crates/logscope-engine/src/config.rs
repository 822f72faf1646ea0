//! Engine configuration.

use std::time::Duration;

/// Tunable limits for the request engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Flush a content batch when it exceeds this many lines.
    pub content_batch_size: usize,
    /// Flush a content batch when this much wall time has elapsed since
    /// the last flush.
    pub content_batch_time: Duration,
    /// Per-file cap on matched lines during search.
    pub search_max_size: usize,
    /// Tree cache entry TTL. Zero disables the cache.
    pub cache_expiration: Duration,
    /// File extensions (including the leading dot) skipped during walks.
    pub exclude_extensions: Vec<String>,
    /// Directory basenames pruned during walks.
    pub exclude_dirs: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            content_batch_size: 2000,
            content_batch_time: Duration::from_secs(2),
            search_max_size: 5000,
            cache_expiration: Duration::from_secs(60),
            exclude_extensions: Vec::new(),
            exclude_dirs: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Set the content batch size.
    #[must_use]
    pub fn with_content_batch_size(mut self, size: usize) -> Self {
        self.content_batch_size = size;
        self
    }

    /// Set the content batch flush interval.
    #[must_use]
    pub fn with_content_batch_time(mut self, time: Duration) -> Self {
        self.content_batch_time = time;
        self
    }

    /// Set the per-file search cap.
    #[must_use]
    pub fn with_search_max_size(mut self, max: usize) -> Self {
        self.search_max_size = max;
        self
    }

    /// Set the tree cache TTL. Zero disables caching.
    #[must_use]
    pub fn with_cache_expiration(mut self, ttl: Duration) -> Self {
        self.cache_expiration = ttl;
        self
    }

    /// Set the excluded file extensions.
    #[must_use]
    pub fn with_exclude_extensions(mut self, extensions: Vec<String>) -> Self {
        self.exclude_extensions = extensions;
        self
    }

    /// Set the pruned directory basenames.
    #[must_use]
    pub fn with_exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.exclude_dirs = dirs;
        self
    }
}
