//! Per-path parser selection.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::structured::{ParserMemory, StructuredParser};
use crate::Log;

/// The record format a configured parser decodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserFormat {
    /// Keyed JSON records, one per line.
    #[default]
    Structured,
}

/// Configuration for one parser entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Regex matched against the source-relative file path.
    pub glob: String,
    /// Record format.
    #[serde(default)]
    pub format: ParserFormat,
    /// Time formats tried in order; see [`StructuredParser::new`].
    #[serde(default)]
    pub time_formats: Vec<String>,
}

struct ConfiguredParser {
    pattern: Regex,
    parser: StructuredParser,
}

/// Selects a parser by file path; falls back to raw lines.
///
/// The first configured entry whose pattern matches the path wins. Paths
/// that match no entry get the raw fallback: the line bytes become the
/// message, with empty level and no time.
pub struct ParserRegistry {
    parsers: Vec<ConfiguredParser>,
}

impl ParserRegistry {
    /// Builds a registry from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::BadPattern`] if any path pattern fails to
    /// compile.
    pub fn new(configs: &[ParserConfig]) -> Result<Self> {
        let mut parsers = Vec::with_capacity(configs.len());
        for config in configs {
            let pattern = Regex::new(&config.glob).map_err(|source| ParseError::BadPattern {
                pattern: config.glob.clone(),
                source,
            })?;
            let parser = match config.format {
                ParserFormat::Structured => StructuredParser::new(&config.time_formats),
            };
            debug!(pattern = %config.glob, "configured parser");
            parsers.push(ConfiguredParser { pattern, parser });
        }
        Ok(Self { parsers })
    }

    /// A registry with no configured parsers; every line is raw.
    #[must_use]
    pub fn raw_only() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Number of configured parsers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Whether any parsers are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Creates fresh per-file state for one scan.
    #[must_use]
    pub fn new_memory(&self) -> ParserMemory {
        ParserMemory::default()
    }

    /// Parses one line of the file at `path`.
    #[must_use]
    pub fn parse(&self, path: &str, line: &[u8], memory: &mut ParserMemory) -> Log {
        for configured in &self.parsers {
            if configured.pattern.is_match(path) {
                return configured.parser.parse(line, memory);
            }
        }
        Log::raw(line)
    }
}
