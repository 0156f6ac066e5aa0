//! Highlighting of matched spans

use crate::core::model::{MatchResult, Span};

/// Start/end strings wrapped around every highlighted span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub start: &'static str,
    pub end: &'static str,
}

impl Markers {
    /// Empty markers: highlighted text is identical to the input
    pub const fn plain() -> Self {
        Self { start: "", end: "" }
    }

    /// Bold red, then reset
    pub const fn ansi() -> Self {
        Self {
            start: "\x1b[1;31m",
            end: "\x1b[0m",
        }
    }

    /// Pick markers for the current output
    pub fn for_output(use_color: bool) -> Self {
        if use_color {
            Self::ansi()
        } else {
            Self::plain()
        }
    }
}

/// Wrap each span of `line` in the markers.
///
/// Spans must be sorted and non-overlapping; out-of-range or misordered spans
/// are skipped rather than sliced.
pub fn highlight(line: &str, spans: &[Span], markers: Markers) -> String {
    let mut out = String::with_capacity(line.len() + spans.len() * 16);
    let mut cursor = 0;

    for span in spans {
        if span.start < cursor
            || span.end > line.len()
            || span.start >= span.end
            || !line.is_char_boundary(span.start)
            || !line.is_char_boundary(span.end)
        {
            continue;
        }
        out.push_str(&line[cursor..span.start]);
        out.push_str(markers.start);
        out.push_str(&line[span.start..span.end]);
        out.push_str(markers.end);
        cursor = span.end;
    }

    out.push_str(&line[cursor..]);
    out
}

impl MatchResult {
    pub fn highlighted(&self, markers: Markers) -> String {
        highlight(&self.line, &self.spans, markers)
    }
}
