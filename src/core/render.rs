//! Renderer module
//!
//! Renders search results as plain text lines or JSON Lines

use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

use crate::core::model::{MatchLevel, MatchResult, Span};
use crate::search::highlight::Markers;

/// Width of the separator printed under the status line
pub const SEPARATOR_WIDTH: usize = 40;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Jsonl,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "jsonl" => Ok(OutputFormat::Jsonl),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and colour
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub color: bool,
}

impl RenderConfig {
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    /// Markers for highlighted spans; JSON output never carries them
    pub fn markers(&self) -> Markers {
        match self.format {
            OutputFormat::Text => Markers::for_output(self.color),
            OutputFormat::Jsonl => Markers::plain(),
        }
    }
}

/// One JSON Lines record
#[derive(Debug, Serialize)]
struct JsonRecord<'a> {
    name: &'a str,
    description: &'a str,
    line: &'a str,
    spans: &'a [Span],
}

/// Streams a search to a writer
pub struct Renderer<W: Write> {
    config: RenderConfig,
    writer: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(config: RenderConfig, writer: W) -> Self {
        Self { config, writer }
    }

    /// Status line and separator (text only)
    pub fn header(&mut self, term: &str, level: MatchLevel) -> io::Result<()> {
        if self.config.format != OutputFormat::Text {
            return Ok(());
        }
        let term = if self.config.color {
            term.bold().to_string()
        } else {
            term.to_string()
        };
        writeln!(self.writer, "Searching for: {} ({})", term, level)?;
        writeln!(self.writer, "{}", "-".repeat(SEPARATOR_WIDTH))
    }

    /// A single match
    pub fn result(&mut self, result: &MatchResult) -> io::Result<()> {
        match self.config.format {
            OutputFormat::Text => {
                writeln!(self.writer, "{}", result.highlighted(self.config.markers()))
            }
            OutputFormat::Jsonl => {
                let record = JsonRecord {
                    name: result.name(),
                    description: result.description(),
                    line: &result.line,
                    spans: &result.spans,
                };
                serde_json::to_writer(&mut self.writer, &record)?;
                writeln!(self.writer)
            }
        }
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
