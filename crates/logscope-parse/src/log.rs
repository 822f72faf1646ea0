//! The parsed log record.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single parsed log line with placement metadata.
///
/// The parser fills `msg`, `level`, `time` and the optional structured
/// fields; the reader fills `fs`, `file_name`, `line` and `offset` after
/// parsing. `line` is 1-based within the file; `offset` is the cumulative
/// byte count of scanned line contents (newline delimiters excluded) up to
/// but not including this line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Log {
    /// The log message. For raw lines this is the line verbatim.
    pub msg: String,
    /// Severity as reported by the source, verbatim. Empty for raw lines.
    pub level: String,
    /// Record timestamp, preserving the source's UTC offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<FixedOffset>>,
    /// Name of the source this line was read from.
    #[serde(default)]
    pub fs: String,
    /// Source-relative slash-joined path of the file.
    #[serde(default)]
    pub file_name: String,
    /// 1-based line number within the file.
    #[serde(default)]
    pub line: u64,
    /// Cumulative content bytes scanned before this line.
    #[serde(default)]
    pub offset: u64,
    /// Thread that emitted the record, when the source reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
    /// Line number in the originating source file, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_no: Option<u64>,
    /// Path of the originating source file, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_of_origin: Option<String>,
}

impl Log {
    /// Creates a raw record from undecodable line bytes.
    #[must_use]
    pub fn raw(line: &[u8]) -> Self {
        Self {
            msg: String::from_utf8_lossy(line).into_owned(),
            ..Self::default()
        }
    }
}
