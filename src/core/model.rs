//! Shared data model
//!
//! Every search produces a stream of `MatchResult`s. Each one carries the cache
//! line it came from and the byte spans that should be emphasized.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// How strictly a search term has to match a cache line.
///
/// Variants are declared from loosest to strictest, so the derived `Ord` is the
/// strictness order and the most restrictive of several selections is just `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum MatchLevel {
    /// Case-insensitive substring anywhere in the line
    #[default]
    Normal,
    /// Literal substring anywhere in the line
    CaseSensitive,
    /// Literal term delimited by non-word characters or the line edges
    WordBoundary,
    /// Package name ends with the term
    EndBoundary,
    /// Term is one whole dotted component at the end of the package name
    ExactComponent,
}

impl MatchLevel {
    /// All levels from loosest to strictest
    #[allow(dead_code)]
    pub const ALL: [MatchLevel; 5] = [
        MatchLevel::Normal,
        MatchLevel::CaseSensitive,
        MatchLevel::WordBoundary,
        MatchLevel::EndBoundary,
        MatchLevel::ExactComponent,
    ];

    /// Pick the strictest of the selected levels, `Normal` when nothing is selected.
    pub fn strictest(selected: impl IntoIterator<Item = MatchLevel>) -> MatchLevel {
        selected.into_iter().max().unwrap_or_default()
    }

    /// Human-readable description used in the status line
    pub fn description(self) -> &'static str {
        match self {
            MatchLevel::Normal => "case-insensitive substring",
            MatchLevel::CaseSensitive => "case-sensitive substring",
            MatchLevel::WordBoundary => "whole word",
            MatchLevel::EndBoundary => "end of package name",
            MatchLevel::ExactComponent => "exact package name component",
        }
    }
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Byte range `[start, end)` inside a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A matching cache line plus the spans to emphasize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub line: String,
    pub spans: Vec<Span>,
}

impl MatchResult {
    pub fn new(line: impl Into<String>, spans: Vec<Span>) -> Self {
        Self {
            line: line.into(),
            spans,
        }
    }

    /// First whitespace-delimited token of the line (the package attribute path)
    pub fn name(&self) -> &str {
        split_entry(&self.line).0
    }

    /// Everything after the package name, with surrounding whitespace removed
    pub fn description(&self) -> &str {
        split_entry(&self.line).1
    }
}

/// Split a cache line into `(name, description)`.
pub fn split_entry(line: &str) -> (&str, &str) {
    let trimmed = line.trim_start();
    match trimmed.find(char::is_whitespace) {
        Some(idx) => (&trimmed[..idx], trimmed[idx..].trim()),
        None => (trimmed, ""),
    }
}

/// Errors raised while maintaining or reading the package cache
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("failed to run package lister `{command}`: {reason}")]
    ListerExecution { command: String, reason: String },

    #[error("package lister `{command}` did not finish within {seconds} seconds")]
    ListerTimeout { command: String, seconds: u64 },

    #[error("failed to write cache file {path:?}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read cache file {path:?}")]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
