//! CLI enum types for the scan command.

use clap::ValueEnum;

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// `<file name> -- <date> -- <fingerprint>` per line
    Text,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl From<OutputFormat> for tomte_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => tomte_core::OutputFormat::Text,
            OutputFormat::Jsonl => tomte_core::OutputFormat::JsonLines,
        }
    }
}
