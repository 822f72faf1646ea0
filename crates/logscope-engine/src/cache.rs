//! TTL cache for merged trees.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use crate::protocol::File;

/// Memoizes merged trees by base-path key.
///
/// Entries hold the *unfiltered* merge; source filtering is applied after
/// lookup. A zero TTL disables caching entirely.
#[derive(Debug, Clone)]
pub struct TreeCache {
    inner: Option<Cache<String, Arc<Vec<File>>>>,
}

impl TreeCache {
    /// Creates a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let inner = (!ttl.is_zero()).then(|| Cache::builder().time_to_live(ttl).build());
        Self { inner }
    }

    /// Looks up a merged tree by base-path key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<Vec<File>>> {
        self.inner.as_ref()?.get(key)
    }

    /// Stores a merged tree.
    pub fn insert(&self, key: String, files: Arc<Vec<File>>) {
        if let Some(cache) = &self.inner {
            cache.insert(key, files);
        }
    }
}
