//! Error types for the tomte fingerprinting pipeline.
//!
//! Pipeline errors always carry the offending path so a failed unit of work
//! can be reported on its own without aborting the rest of a batch.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for tomte operations.
#[derive(Error, Debug)]
pub enum TomteError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-file pipeline errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// File could not be read or decoded as an image
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Decoded pixels could not be re-encoded in their source format
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Format could not be determined from content or extension
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The worker running this file panicked or was cancelled
    #[error("Worker failed for {path}: {message}")]
    Worker { path: PathBuf, message: String },
}

impl PipelineError {
    /// The file this error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            PipelineError::Decode { path, .. }
            | PipelineError::Encode { path, .. }
            | PipelineError::FileTooLarge { path, .. }
            | PipelineError::ImageTooLarge { path, .. }
            | PipelineError::UnsupportedFormat { path, .. }
            | PipelineError::Worker { path, .. } => path,
            PipelineError::FileNotFound(path) => path,
        }
    }
}

/// Convenience type alias for tomte results.
pub type Result<T> = std::result::Result<T, TomteError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
