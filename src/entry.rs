use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Conventional syslog-like layout applied on both the read and the write
/// side when the caller passes an empty pattern.
pub const DEFAULT_PATTERN: &str = "%t(mmm d HH:MM:ss) %u %n[%p]: %m";

/// Resolves the empty-pattern case to the default layout. The pattern
/// compilers themselves keep rejecting empty input.
pub(crate) fn resolve_pattern(pattern: &str) -> &str {
    if pattern.is_empty() {
        DEFAULT_PATTERN
    } else {
        pattern
    }
}

/// One parsed log line.
///
/// An entry is built fresh for every candidate line and mutated in place by
/// the compiled extractors; `line` and `line_number` are filled in last, and
/// only once the line has matched the pattern and passed the filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entry {
    #[serde(skip)]
    pub line: String,
    #[serde(skip)]
    pub line_number: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub process: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub level: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Positional captures, in specifier order.
    #[serde(skip)]
    pub words: Vec<String>,
    /// Captures recorded under an explicit name.
    #[serde(skip)]
    pub named: HashMap<String, String>,

    #[serde(rename = "hostname", skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(rename = "time", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
}

impl Entry {
    pub fn new() -> Self {
        Entry::default()
    }
}
