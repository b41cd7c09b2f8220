//! Output formatting for result lines.
//!
//! Results are written one per line, either as the human-readable
//! `name -- date -- fingerprint` form or as one JSON object per line.

use std::io::{self, Write};

use crate::types::FileResult;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `<file name> -- <date> -- <fingerprint>`
    Text,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// A writer that renders results in the chosen format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            items_written: 0,
        }
    }

    /// Write a single result as one line.
    pub fn write(&mut self, result: &FileResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.writer, "{}", result)?,
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, result).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Announce how many files are about to be processed.
    ///
    /// Text output gets a `COUNT: <n>` line; JSON Lines output stays one
    /// result object per line, so nothing is written there.
    pub fn write_count(&mut self, count: usize) -> io::Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(self.writer, "COUNT: {}", count)?;
        }
        Ok(())
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
