//! Content fingerprints computed from decoded pixels.
//!
//! The digest covers the pixel payload as re-encoded by the image codec, not
//! the bytes on disk. Two files that differ only in their metadata block (or
//! in name, or in filesystem timestamps) get the same fingerprint.

use sha1::{Digest, Sha1};
use std::io::{Cursor, Read};
use std::path::Path;

use crate::config::{Config, FingerprintConfig, LimitsConfig};
use crate::error::PipelineError;

use super::decode::{format_to_string, DecodedImage, ImageDecoder};

/// Computes pixel-content fingerprints.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    decoder: ImageDecoder,
    chunk_size: usize,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new(LimitsConfig::default(), FingerprintConfig::default())
    }
}

impl Fingerprinter {
    pub fn new(limits: LimitsConfig, fingerprint: FingerprintConfig) -> Self {
        Self {
            decoder: ImageDecoder::new(limits),
            chunk_size: fingerprint.chunk_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.limits.clone(), config.fingerprint.clone())
    }

    /// Fingerprint one image file as a 40-character lowercase hex SHA-1.
    ///
    /// Fails with `PipelineError::Decode` for empty, truncated or non-image
    /// files; there is no fallback digest.
    pub fn fingerprint(&self, path: &Path) -> Result<String, PipelineError> {
        let decoded = self.decoder.decode(path)?;
        tracing::trace!(
            "  Decoded {:?}: {}x{} {}",
            path,
            decoded.width,
            decoded.height,
            format_to_string(decoded.format)
        );
        let payload = Self::reencode(&decoded, path)?;
        digest_reader(Cursor::new(payload), self.chunk_size).map_err(|e| {
            PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Hash error: {}", e),
            }
        })
    }

    /// Write the bare pixel buffer back out in its source format.
    ///
    /// The encoder never sees the source's metadata, so the output carries
    /// none.
    fn reencode(decoded: &DecodedImage, path: &Path) -> Result<Vec<u8>, PipelineError> {
        let mut payload = Vec::new();
        decoded
            .image
            .write_to(&mut Cursor::new(&mut payload), decoded.format)
            .map_err(|e| PipelineError::Encode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(payload)
    }
}

/// SHA-1 of everything `reader` yields, fed to the digest `chunk_size` bytes
/// at a time. The result does not depend on the chunk size.
pub fn digest_reader<R: Read>(mut reader: R, chunk_size: usize) -> std::io::Result<String> {
    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
