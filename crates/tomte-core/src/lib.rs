//! Tomte Core - content fingerprints and capture dates for image files.
//!
//! Each image is identified by a SHA-1 over its pixel payload as re-encoded by
//! the image codec, so copies that differ only in metadata, name or
//! filesystem timestamps share a fingerprint. The EXIF capture date is read
//! alongside, with [`UNKNOWN_DATE`] standing in when there is none.
//!
//! # Architecture
//!
//! ```text
//! paths → BatchProcessor → (per file, in parallel) Fingerprinter + MetadataExtractor
//!       → FileOutcome stream, in completion order
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use tomte_core::{BatchProcessor, Config, FileDiscovery, FileOutcome};
//!
//! #[tokio::main]
//! async fn main() -> tomte_core::Result<()> {
//!     let config = Config::load()?;
//!     let files = FileDiscovery::new(config.processing.clone()).discover("./photos".as_ref(), true);
//!
//!     let mut stream = BatchProcessor::new(&config).run(files);
//!     while let Some(outcome) = stream.next().await {
//!         if let FileOutcome::Completed(result) = outcome {
//!             println!("{result}");
//!         }
//!     }
//!     stream.join().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, Result, TomteError};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    process_file, BatchOptions, BatchProcessor, BatchStream, BatchSummary, FileDiscovery,
    Fingerprinter, MetadataExtractor,
};
pub use types::{FileFailure, FileOutcome, FileResult, UNKNOWN_DATE};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
