//! Named sources and the frozen registry.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SourceError};
use crate::fs::SourceFs;
use crate::local::LocalFs;

/// A named filesystem backend presented as one node to clients.
#[derive(Clone)]
pub struct Source {
    /// Unique name within the registry.
    pub name: String,
    /// The backend.
    pub fs: Arc<dyn SourceFs>,
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source").field("name", &self.name).finish()
    }
}

impl Source {
    /// Creates a named source over a backend.
    pub fn new(name: impl Into<String>, fs: Arc<dyn SourceFs>) -> Self {
        Self {
            name: name.into(),
            fs,
        }
    }
}

/// Configuration for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Unique source name.
    pub name: String,
    /// Local root directory.
    pub root: PathBuf,
}

/// The process-wide source registry, immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    sources: Vec<Source>,
}

impl Sources {
    /// Creates a registry, validating name uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::DuplicateName`] if two sources share a name.
    pub fn new(sources: Vec<Source>) -> Result<Self> {
        let mut seen = HashSet::new();
        for source in &sources {
            if !seen.insert(source.name.clone()) {
                return Err(SourceError::DuplicateName(source.name.clone()));
            }
        }
        Ok(Self { sources })
    }

    /// Builds a registry of local backends from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate names or a root that is not a
    /// directory.
    pub fn from_configs(configs: &[SourceConfig]) -> Result<Self> {
        let mut sources = Vec::with_capacity(configs.len());
        for config in configs {
            if !config.root.is_dir() {
                return Err(SourceError::BadRoot(config.root.clone()));
            }
            sources.push(Source::new(
                config.name.clone(),
                Arc::new(LocalFs::new(config.root.clone())),
            ));
        }
        Self::new(sources)
    }

    /// Iterates over all sources.
    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    /// The sources whose names are in `filter`; an empty filter selects
    /// all of them.
    #[must_use]
    pub fn filtered(&self, filter: &HashSet<&str>) -> Vec<Source> {
        if filter.is_empty() {
            return self.sources.clone();
        }
        self.sources
            .iter()
            .filter(|s| filter.contains(s.name.as_str()))
            .cloned()
            .collect()
    }

    /// Number of registered sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
