//! Structured (keyed JSON) log records.
//!
//! This module provides:
//! - [`StructuredParser`] — Decodes one-record-per-line JSON logs
//! - [`ParserMemory`] — Per-file continuation state
//! - Time parsing against a configured format list
//! - Printf-style interpolation of a record's `args` into its message

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Per-file parser state.
///
/// The reader creates one memory per file scan and threads it through
/// every parse call for that file; memories are never shared across files
/// or sources. The structured parser records the last decoded record's
/// level and time here so that continuation lines (raw text following a
/// structured record, e.g. a traceback) inherit them.
#[derive(Debug, Default)]
pub struct ParserMemory {
    context: Option<Continuation>,
}

#[derive(Debug)]
struct Continuation {
    level: String,
    time: Option<DateTime<FixedOffset>>,
}

/// A time format the structured parser will try, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    /// RFC 3339 / ISO 8601 with offset.
    Rfc3339,
    /// Seconds since the epoch as a float.
    UnixFloat,
    /// Seconds since the epoch as an integer.
    UnixInt,
    /// A chrono strftime format string.
    Custom(String),
}

impl TimeFormat {
    fn from_name(name: &str) -> Self {
        match name {
            "rfc3339" => Self::Rfc3339,
            "unix_float" => Self::UnixFloat,
            "unix_int" => Self::UnixInt,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// The shape of a keyed record. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct Record {
    msg: String,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    time: Option<serde_json::Value>,
    #[serde(default)]
    thread: Option<String>,
    #[serde(default)]
    line_no: Option<u64>,
    #[serde(default)]
    path_of_origin: Option<String>,
    #[serde(default)]
    args: Option<serde_json::Value>,
}

/// Parser for keyed JSON records with raw-line continuation support.
#[derive(Debug, Clone)]
pub struct StructuredParser {
    time_formats: Vec<TimeFormat>,
}

impl Default for StructuredParser {
    fn default() -> Self {
        Self::new(&["rfc3339".to_string()])
    }
}

impl StructuredParser {
    /// Creates a parser that recognizes the given time formats, tried in
    /// order. Names `rfc3339`, `unix_float` and `unix_int` are special;
    /// anything else is treated as a chrono strftime string.
    #[must_use]
    pub fn new(time_formats: &[String]) -> Self {
        Self {
            time_formats: time_formats
                .iter()
                .map(|f| TimeFormat::from_name(f))
                .collect(),
        }
    }

    /// Parses one line. Lines that do not decode as a keyed record become
    /// continuations of the previous record when one exists in `memory`,
    /// and raw records otherwise.
    #[must_use]
    pub fn parse(&self, line: &[u8], memory: &mut ParserMemory) -> crate::Log {
        if let Some(record) = decode_record(line) {
            let time = record
                .time
                .as_ref()
                .and_then(|v| self.parse_time(&time_value_string(v)));
            let level = record.level.unwrap_or_default();
            memory.context = Some(Continuation {
                level: level.clone(),
                time,
            });

            let mut msg = record.msg;
            if let Some(args) = record.args {
                inject_args(&mut msg, &args);
            }
            return crate::Log {
                msg,
                level,
                time,
                thread: record.thread,
                line_no: record.line_no,
                path_of_origin: record.path_of_origin,
                ..crate::Log::default()
            };
        }

        // Continuation lines inherit the preceding record's level and time.
        if let Some(ctx) = &memory.context {
            let mut log = crate::Log::raw(line);
            log.level = ctx.level.clone();
            log.time = ctx.time;
            return log;
        }
        crate::Log::raw(line)
    }

    /// Tries each configured format in order; the first successful parse
    /// wins. Commas are normalized to dots first so `12:00:00,123`-style
    /// fractional seconds parse.
    fn parse_time(&self, value: &str) -> Option<DateTime<FixedOffset>> {
        let value = value.replace(',', ".");
        for format in &self.time_formats {
            match format {
                TimeFormat::Rfc3339 => {
                    if let Ok(t) = DateTime::parse_from_rfc3339(&value) {
                        return Some(t);
                    }
                }
                TimeFormat::UnixFloat => {
                    if let Ok(f) = value.parse::<f64>() {
                        return unix_time(f.trunc() as i64, (f.fract() * 1e9) as u32);
                    }
                }
                TimeFormat::UnixInt => {
                    if let Ok(i) = value.parse::<i64>() {
                        return unix_time(i, 0);
                    }
                }
                TimeFormat::Custom(fmt) => {
                    if let Ok(t) = DateTime::parse_from_str(&value, fmt) {
                        return Some(t);
                    }
                    if let Ok(t) = chrono::NaiveDateTime::parse_from_str(&value, fmt) {
                        return Some(t.and_utc().fixed_offset());
                    }
                }
            }
        }
        None
    }
}

fn unix_time(secs: i64, nanos: u32) -> Option<DateTime<FixedOffset>> {
    match Utc.timestamp_opt(secs, nanos) {
        chrono::LocalResult::Single(t) => Some(t.fixed_offset()),
        _ => None,
    }
}

fn decode_record(line: &[u8]) -> Option<Record> {
    let trimmed = trim_ascii_start(line);
    if !trimmed.starts_with(b"{") {
        return None;
    }
    serde_json::from_slice(trimmed).ok()
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn time_value_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `%(name)s`-style keyword placeholders.
fn keyword_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"%\(([^)]+)\)[diouxXeEfFgGcrs]").expect("keyword pattern compiles")
    })
}

/// `%s`-style positional placeholders.
fn positional_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"%[diouxXeEfFgGcrsv]").expect("positional pattern compiles"))
}

/// Interpolates a record's `args` into its message.
///
/// A JSON array fills positional placeholders in order; a JSON object
/// substitutes `%(name)<verb>` keywords, leaving unknown keywords
/// verbatim; a JSON-encoded string is decoded once and re-dispatched.
fn inject_args(msg: &mut String, args: &serde_json::Value) {
    match args {
        serde_json::Value::Array(items) => {
            let mut next = items.iter();
            let replaced = positional_pattern()
                .replace_all(msg.as_str(), |_: &regex::Captures<'_>| {
                    next.next().map(value_display).unwrap_or_default()
                })
                .into_owned();
            *msg = replaced;
        }
        serde_json::Value::Object(map) => {
            let replaced = keyword_pattern()
                .replace_all(msg.as_str(), |caps: &regex::Captures<'_>| {
                    let key = &caps[1];
                    map.get(key)
                        .map_or_else(|| caps[0].to_string(), value_display)
                })
                .into_owned();
            *msg = replaced;
        }
        serde_json::Value::String(encoded) => {
            if let Ok(decoded) = serde_json::from_str::<serde_json::Value>(encoded) {
                inject_args(msg, &decoded);
            }
        }
        _ => {}
    }
}

fn value_display(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
