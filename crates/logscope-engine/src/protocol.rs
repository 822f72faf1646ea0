//! The wire model: requests, responses and the merged file tree.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Utc};
use logscope_parse::Log;
use serde::{Deserialize, Serialize};

/// A source-relative path as an ordered sequence of segments.
///
/// The empty sequence denotes the source root. Serialized form is the
/// segment array; the slash-joined form is used as the tree merge key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<String>);

impl Path {
    /// Builds a path from segments.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Builds a path from a slash-joined key, dropping empty components.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        Self(
            key.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// The slash-joined merge key. Empty for the root.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.join("/")
    }

    /// The path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this is the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Request/response action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Merge and return the file tree under a base path.
    GetFileTree,
    /// Stream parsed contents of one logical file across sources.
    GetContent,
    /// Regex search across all files under a base path.
    Search,
    /// Anything else. Ignored beyond the terminal marker.
    #[default]
    #[serde(other, rename = "unknown")]
    Unknown,
}

/// Request/response metadata. The client-chosen `id` is echoed verbatim
/// and only used to group responses and drive preemption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Client-chosen request id.
    #[serde(default)]
    pub id: i64,
    /// The action.
    #[serde(default)]
    pub action: Action,
    /// Originating source, set on per-source payload responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs: Option<String>,
    /// File path, set on per-source payload responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,
}

impl Meta {
    /// Metadata echoing a request's id and action only.
    #[must_use]
    pub fn reply(id: i64, action: Action) -> Self {
        Self {
            id,
            action,
            fs: None,
            path: None,
        }
    }

    /// Metadata for a per-source file stream.
    #[must_use]
    pub fn for_file(id: i64, action: Action, fs: impl Into<String>, path: Path) -> Self {
        Self {
            id,
            action,
            fs: Some(fs.into()),
            path: Some(path),
        }
    }
}

/// A half-open pair of optional time bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Keep records at or after this instant.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Keep records at or before this instant.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Whether a record with the given timestamp is filtered out.
    ///
    /// Both bounds are checked; a record without a timestamp is dropped
    /// whenever either bound is set.
    #[must_use]
    pub fn excludes(&self, time: Option<DateTime<FixedOffset>>) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return false;
        }
        let Some(time) = time else {
            return true;
        };
        let time = time.with_timezone(&Utc);
        if self.start.is_some_and(|start| time < start) {
            return true;
        }
        self.end.is_some_and(|end| time > end)
    }
}

/// A client request.
///
/// `path` and `base_path` are interchangeable ways to name the base
/// location; the non-empty one wins.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Request {
    /// Request metadata.
    pub meta: Meta,
    /// Base location.
    #[serde(default)]
    pub path: Path,
    /// Alternate spelling of the base location.
    #[serde(default)]
    pub base_path: Path,
    /// Search pattern (search action only).
    #[serde(default)]
    pub regexp: String,
    /// Restrict the request to these sources; empty means all.
    #[serde(default)]
    pub filter_fs: Vec<String>,
    /// Drop records outside this time range.
    #[serde(default)]
    pub filter_time: TimeRange,
}

impl Request {
    /// The effective base location.
    #[must_use]
    pub fn base(&self) -> &Path {
        if self.path.is_empty() {
            &self.base_path
        } else {
            &self.path
        }
    }

    /// The source filter as a set.
    #[must_use]
    pub fn filter_set(&self) -> HashSet<&str> {
        self.filter_fs.iter().map(String::as_str).collect()
    }
}

/// One instance of a logical file on one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInstance {
    /// Size in bytes on that source.
    pub size: u64,
    /// Source name.
    pub fs: String,
}

/// A node of the merged file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Slash-joined source-relative path; the merge key.
    pub key: String,
    /// The path as segments.
    pub path: Path,
    /// Whether the node is a directory.
    pub is_dir: bool,
    /// Every source where this key exists, in arbitrary order.
    pub instances: Vec<FileInstance>,
}

impl File {
    /// The file restricted to the given sources, or `None` when no
    /// instance survives (the file does not exist there at all).
    #[must_use]
    pub fn filter_sources(&self, sources: &HashSet<&str>) -> Option<Self> {
        let instances: Vec<FileInstance> = self
            .instances
            .iter()
            .filter(|i| sources.contains(i.fs.as_str()))
            .cloned()
            .collect();
        if instances.is_empty() {
            return None;
        }
        Some(Self {
            key: self.key.clone(),
            path: self.path.clone(),
            is_dir: self.is_dir,
            instances,
        })
    }
}

/// Applies a source filter to a merged tree. An empty filter keeps
/// everything.
#[must_use]
pub fn filter_files(files: &[File], sources: &HashSet<&str>) -> Vec<File> {
    if sources.is_empty() {
        return files.to_vec();
    }
    files
        .iter()
        .filter_map(|f| f.filter_sources(sources))
        .collect()
}

/// A server response. Payload responses carry either `lines` or `tree`,
/// never both; exactly one response per request id has `finished` set and
/// it is always the last one for that id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response metadata.
    pub meta: Meta,
    /// Parsed log lines (content and search actions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<Log>>,
    /// Merged file tree (tree action).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<Vec<File>>,
    /// Human-readable request error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Terminal marker.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub finished: bool,
}

impl Response {
    /// The terminal marker for a request.
    #[must_use]
    pub fn finished(meta: Meta) -> Self {
        Self {
            meta,
            finished: true,
            ..Self::default()
        }
    }

    /// An error response.
    #[must_use]
    pub fn error(meta: Meta, message: impl Into<String>) -> Self {
        Self {
            meta,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// A batch of parsed lines.
    #[must_use]
    pub fn lines(meta: Meta, lines: Vec<Log>) -> Self {
        Self {
            meta,
            lines: Some(lines),
            ..Self::default()
        }
    }

    /// A merged tree.
    #[must_use]
    pub fn tree(meta: Meta, files: Vec<File>) -> Self {
        Self {
            meta,
            tree: Some(files),
            ..Self::default()
        }
    }
}
