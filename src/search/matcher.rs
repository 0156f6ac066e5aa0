//! Per-line matching for the five strictness levels
//!
//! The term is always a literal. It is escaped before it is compiled into a
//! regex and compared with plain `str` operations everywhere else.

use anyhow::{ensure, Context, Result};
use regex::{Regex, RegexBuilder};

use crate::core::model::{split_entry, MatchLevel, MatchResult, Span};

/// A compiled search term at a fixed strictness level
#[derive(Debug, Clone)]
pub struct Matcher {
    term: String,
    level: MatchLevel,
    insensitive: Regex,
}

impl Matcher {
    pub fn new(term: &str, level: MatchLevel) -> Result<Self> {
        ensure!(!term.is_empty(), "search term must not be empty");

        let insensitive = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
            .context("Invalid search term")?;

        Ok(Self {
            term: term.to_string(),
            level,
            insensitive,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn level(&self) -> MatchLevel {
        self.level
    }

    /// Test a single line, returning the highlight spans when it matches.
    pub fn find(&self, line: &str) -> Option<Vec<Span>> {
        if line.trim().is_empty() {
            return None;
        }

        match self.level {
            // Simple case folding, so every literal occurrence is also found here.
            MatchLevel::Normal => non_empty(
                self.insensitive
                    .find_iter(line)
                    .map(|m| Span::new(m.start(), m.end()))
                    .collect(),
            ),
            MatchLevel::CaseSensitive => {
                let spans: Vec<Span> = line
                    .match_indices(self.term.as_str())
                    .map(|(start, m)| Span::new(start, start + m.len()))
                    .collect();
                non_empty(spans)
            }
            MatchLevel::WordBoundary => non_empty(word_spans(line, &self.term)),
            MatchLevel::EndBoundary => {
                let (name_start, name) = name_of(line);
                let at_end = name.strip_suffix(self.term.as_str()).is_some_and(|head| {
                    head.chars()
                        .next_back()
                        .map_or(true, |c| !is_word_char(c))
                });
                if !at_end {
                    return None;
                }
                Some(vec![tail_span(name_start, name, &self.term)])
            }
            MatchLevel::ExactComponent => {
                let (name_start, name) = name_of(line);
                let is_component = name == self.term
                    || name
                        .strip_suffix(self.term.as_str())
                        .is_some_and(|head| head.ends_with('.'));
                if !is_component {
                    return None;
                }
                Some(vec![tail_span(name_start, name, &self.term)])
            }
        }
    }

    /// Match a raw line. On success the line is kept with trailing whitespace
    /// stripped and the spans are clipped to it.
    pub fn match_line(&self, line: &str) -> Option<MatchResult> {
        let spans = self.find(line)?;
        let kept = line.trim_end();
        let spans = spans
            .into_iter()
            .filter(|span| span.start < kept.len())
            .map(|span| Span::new(span.start, span.end.min(kept.len())))
            .collect();
        Some(MatchResult::new(kept, spans))
    }
}

fn non_empty(spans: Vec<Span>) -> Option<Vec<Span>> {
    if spans.is_empty() {
        None
    } else {
        Some(spans)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offset and text of the package name (first whitespace-delimited token)
fn name_of(line: &str) -> (usize, &str) {
    let (name, _) = split_entry(line);
    let start = line.len() - line.trim_start().len();
    (start, name)
}

/// Span of `term` at the end of `name`; a leading `.` stays outside.
fn tail_span(name_start: usize, name: &str, term: &str) -> Span {
    let end = name_start + name.len();
    Span::new(end - term.len(), end)
}

/// Occurrences of `term` bounded by non-word characters or the line edges.
///
/// Candidates are tried at every position so an occurrence hidden behind a
/// rejected overlapping one is still found. Accepted spans never overlap.
fn word_spans(line: &str, term: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(offset) = line[pos..].find(term) {
        let start = pos + offset;
        let end = start + term.len();

        let before_ok = line[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = line[end..].chars().next().map_or(true, |c| !is_word_char(c));

        if before_ok && after_ok {
            spans.push(Span::new(start, end));
            pos = end;
        } else {
            // Step past the first char of the rejected candidate.
            pos = start + line[start..].chars().next().map_or(1, char::len_utf8);
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[&str] = &[
        "pkgs.foo.bar   A sample tool",
        "pkgs.foobar   Another tool",
        "pkgs.foo  desc",
        "nixpkgs.python3Packages.foo-bar   Foo bindings for bar",
        "nixpkgs.FOO   Shouting foo",
        "nixpkgs.c++   C plus plus (c++) toolchain",
        "nixpkgs.xfoo_baz   Underscore foo_baz",
    ];

    const TERMS: &[&str] = &["foo", "bar", "FOO", "c++", "tool", "foo.bar", "baz", "a"];

    fn matches(term: &str, level: MatchLevel) -> Vec<&'static str> {
        let matcher = Matcher::new(term, level).unwrap();
        SAMPLE
            .iter()
            .copied()
            .filter(|line| matcher.find(line).is_some())
            .collect()
    }

    fn spans_text<'a>(line: &'a str, spans: &[Span]) -> Vec<&'a str> {
        spans.iter().map(|s| &line[s.start..s.end]).collect()
    }

    #[test]
    fn test_empty_term_is_rejected() {
        assert!(Matcher::new("", MatchLevel::Normal).is_err());
    }

    #[test]
    fn test_normal_is_case_insensitive_substring() {
        for term in TERMS {
            let found = matches(term, MatchLevel::Normal);
            for line in SAMPLE {
                let expected = line.to_lowercase().contains(&term.to_lowercase());
                assert_eq!(found.contains(line), expected, "term {term:?} line {line:?}");
            }
        }
    }

    #[test]
    fn test_normal_highlights_every_case_variant() {
        let matcher = Matcher::new("foo", MatchLevel::Normal).unwrap();
        let line = "nixpkgs.FOO   Shouting foo";
        let spans = matcher.find(line).unwrap();
        assert_eq!(spans_text(line, &spans), vec!["FOO", "foo"]);
    }

    #[test]
    fn test_case_sensitive_is_subset_of_normal() {
        for term in TERMS {
            let normal = matches(term, MatchLevel::Normal);
            for line in matches(term, MatchLevel::CaseSensitive) {
                assert!(normal.contains(&line), "term {term:?} line {line:?}");
            }
        }
        assert_eq!(
            matches("FOO", MatchLevel::CaseSensitive),
            vec!["nixpkgs.FOO   Shouting foo"]
        );
    }

    #[test]
    fn test_case_sensitive_is_subset_of_normal_beyond_ascii() {
        // Greek capital sigma lowercases to the final form at the end of a word.
        let line = "pkgs.greek   ΟΔΟΣ road";
        for term in ["Σ", "ΟΣ", "ΟΔΟΣ"] {
            let cs = Matcher::new(term, MatchLevel::CaseSensitive).unwrap();
            let normal = Matcher::new(term, MatchLevel::Normal).unwrap();
            assert!(cs.find(line).is_some(), "term {term:?}");
            assert_eq!(normal.find(line), cs.find(line), "term {term:?}");
        }

        let normal = Matcher::new("σ", MatchLevel::Normal).unwrap();
        let spans = normal.find(line).unwrap();
        assert_eq!(spans_text(line, &spans), vec!["Σ"]);
    }

    #[test]
    fn test_normal_match_always_has_spans() {
        for term in ["ß", "ς", "İ", "K"] {
            let matcher = Matcher::new(term, MatchLevel::Normal).unwrap();
            for line in ["pkgs.strasse   STRASSE", "pkgs.x   ΟΔΟΣ", "pkgs.i   i̇ kelvin K"] {
                if let Some(spans) = matcher.find(line) {
                    assert!(!spans.is_empty(), "term {term:?} line {line:?}");
                }
            }
        }
    }

    #[test]
    fn test_exact_component_is_subset_of_word_boundary() {
        for term in TERMS {
            let word = matches(term, MatchLevel::WordBoundary);
            for line in matches(term, MatchLevel::ExactComponent) {
                assert!(word.contains(&line), "term {term:?} line {line:?}");
            }
        }
    }

    #[test]
    fn test_strictness_levels_nest() {
        for term in TERMS {
            for pair in MatchLevel::ALL.windows(2) {
                let looser = matches(term, pair[0]);
                for line in matches(term, pair[1]) {
                    assert!(
                        looser.contains(&line),
                        "term {term:?} line {line:?} matched {:?} but not {:?}",
                        pair[1],
                        pair[0]
                    );
                }
            }
        }
    }

    #[test]
    fn test_word_boundary_respects_word_chars() {
        let matcher = Matcher::new("foo", MatchLevel::WordBoundary).unwrap();
        assert!(matcher.find("pkgs.foo.bar   A sample tool").is_some());
        assert!(matcher.find("pkgs.foobar   Another tool").is_none());
        // '_' is a word character
        assert!(matcher.find("nixpkgs.xfoo_baz   Underscore foo_baz").is_none());
        // '-' is not
        assert!(matcher.find("nixpkgs.python3Packages.foo-bar   Foo bindings").is_some());
    }

    #[test]
    fn test_word_boundary_finds_overlapped_occurrence() {
        let matcher = Matcher::new("a-a", MatchLevel::WordBoundary).unwrap();
        let line = "xa-a-a";
        let spans = matcher.find(line).unwrap();
        assert_eq!(spans, vec![Span::new(3, 6)]);
    }

    #[test]
    fn test_word_boundary_term_with_punctuation_edges() {
        let matcher = Matcher::new("c++", MatchLevel::WordBoundary).unwrap();
        let line = "nixpkgs.c++   C plus plus (c++) toolchain";
        let spans = matcher.find(line).unwrap();
        assert_eq!(spans_text(line, &spans), vec!["c++", "c++"]);
    }

    #[test]
    fn test_term_is_literal_not_a_pattern() {
        let matcher = Matcher::new("foo.bar", MatchLevel::Normal).unwrap();
        assert!(matcher.find("pkgs.fooXbar   nope").is_none());
        assert!(matcher.find("pkgs.foo.bar   yes").is_some());

        let matcher = Matcher::new(".*", MatchLevel::Normal).unwrap();
        assert!(matcher.find("pkgs.anything   at all").is_none());
    }

    #[test]
    fn test_scenario_foo_and_bar() {
        let lines = ["pkgs.foo.bar   A sample tool", "pkgs.foobar   Another tool"];
        let count = |term: &str, level| {
            let matcher = Matcher::new(term, level).unwrap();
            lines.iter().filter(|l| matcher.find(l).is_some()).count()
        };

        assert_eq!(count("foo", MatchLevel::Normal), 2);
        assert_eq!(count("foo", MatchLevel::ExactComponent), 0);

        let end = Matcher::new("bar", MatchLevel::EndBoundary).unwrap();
        assert!(end.find(lines[0]).is_some());
        assert!(end.find(lines[1]).is_none());

        let exact = Matcher::new("bar", MatchLevel::ExactComponent).unwrap();
        assert!(exact.find(lines[0]).is_some());
        assert!(exact.find(lines[1]).is_none());
    }

    #[test]
    fn test_exact_component_matches_whole_component_only() {
        assert_eq!(matches("foo", MatchLevel::ExactComponent), vec!["pkgs.foo  desc"]);
    }

    #[test]
    fn test_exact_component_accepts_whole_name() {
        let matcher = Matcher::new("hello", MatchLevel::ExactComponent).unwrap();
        assert!(matcher.find("hello   GNU hello").is_some());
    }

    #[test]
    fn test_end_boundary_allows_non_dot_separator() {
        let end = Matcher::new("bar", MatchLevel::EndBoundary).unwrap();
        let exact = Matcher::new("bar", MatchLevel::ExactComponent).unwrap();
        let line = "nixpkgs.python3Packages.foo-bar   Foo bindings for bar";
        assert!(end.find(line).is_some());
        assert!(exact.find(line).is_none());
    }

    #[test]
    fn test_end_boundary_ignores_description() {
        let matcher = Matcher::new("tool", MatchLevel::EndBoundary).unwrap();
        assert!(matcher.find("pkgs.foo.bar   A sample tool").is_none());
    }

    #[test]
    fn test_exact_component_highlight_excludes_dot() {
        let matcher = Matcher::new("bar", MatchLevel::ExactComponent).unwrap();
        let line = "pkgs.foo.bar   A sample tool";
        let spans = matcher.find(line).unwrap();
        assert_eq!(spans, vec![Span::new(9, 12)]);
        assert_eq!(&line[8..9], ".");
    }

    #[test]
    fn test_name_span_accounts_for_leading_whitespace() {
        let matcher = Matcher::new("bar", MatchLevel::EndBoundary).unwrap();
        let line = "  pkgs.foo.bar   A sample tool";
        let spans = matcher.find(line).unwrap();
        assert_eq!(spans_text(line, &spans), vec!["bar"]);
        assert_eq!(spans[0].end, 14);
    }

    #[test]
    fn test_blank_lines_never_match() {
        let matcher = Matcher::new("a", MatchLevel::Normal).unwrap();
        assert!(matcher.find("").is_none());
        assert!(matcher.find("   ").is_none());
    }

    #[test]
    fn test_match_line_strips_trailing_whitespace() {
        let matcher = Matcher::new("foo", MatchLevel::Normal).unwrap();
        let result = matcher.match_line("pkgs.foo  desc\r").unwrap();
        assert_eq!(result.line, "pkgs.foo  desc");
    }

    #[test]
    fn test_trailing_space_in_term_matches_raw_line() {
        let matcher = Matcher::new("tool ", MatchLevel::Normal).unwrap();
        let result = matcher.match_line("pkgs.x  A tool  ").unwrap();
        assert_eq!(result.line, "pkgs.x  A tool");
        assert_eq!(result.spans, vec![Span::new(10, 14)]);

        let matcher = Matcher::new("tool ", MatchLevel::CaseSensitive).unwrap();
        assert!(matcher.match_line("pkgs.x  A tool  ").is_some());
        assert!(matcher.match_line("pkgs.x  A tool").is_none());
    }

    #[test]
    fn test_spans_past_stripped_end_are_dropped() {
        let matcher = Matcher::new(" ", MatchLevel::CaseSensitive).unwrap();
        let result = matcher.match_line("pkgs.x y  ").unwrap();
        assert_eq!(result.line, "pkgs.x y");
        assert_eq!(result.spans, vec![Span::new(6, 7)]);
    }
}
