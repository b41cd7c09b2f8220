//! Image fingerprinting pipeline components.
//!
//! - **decode**: Load and decode images, enforcing size limits
//! - **hash**: Re-encode pixels and compute the SHA-1 fingerprint
//! - **metadata**: Extract the EXIF capture date
//! - **discovery**: Find image files in directories
//! - **batch**: Run many files concurrently and stream the outcomes

pub mod batch;
pub mod decode;
pub mod discovery;
pub mod hash;
pub mod metadata;

#[cfg(test)]
mod fixtures;

// Re-exports for convenient access
pub use batch::{process_file, BatchOptions, BatchProcessor, BatchStream, BatchSummary};
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::FileDiscovery;
pub use hash::{digest_reader, Fingerprinter};
pub use metadata::{parse_exif_datetime, MetadataExtractor};
