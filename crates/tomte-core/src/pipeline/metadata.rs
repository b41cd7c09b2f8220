//! Capture date extraction from EXIF metadata.

use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::types::UNKNOWN_DATE;

/// Layout of EXIF date strings, e.g. `2020:01:01 10:00:00`.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Extracts capture dates from image files.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Read the date stored in tag 306 (`DateTime`) of the primary IFD.
    ///
    /// Never fails. An unreadable file, missing EXIF block, missing tag,
    /// non-text value or unparsable text all yield [`UNKNOWN_DATE`].
    pub fn extract_date(path: &Path) -> NaiveDateTime {
        Self::read_date(path).unwrap_or_else(|| {
            tracing::trace!("  No usable DateTime tag in {:?}", path);
            *UNKNOWN_DATE
        })
    }

    fn read_date(path: &Path) -> Option<NaiveDateTime> {
        let file = File::open(path).ok()?;
        let mut reader = BufReader::new(file);
        let exif = Reader::new().read_from_container(&mut reader).ok()?;
        let field = exif.get_field(Tag::DateTime, In::PRIMARY)?;

        match &field.value {
            Value::Ascii(parts) => {
                let text = std::str::from_utf8(parts.first()?).ok()?;
                parse_exif_datetime(text)
            }
            _ => None,
        }
    }
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` string.
///
/// Trailing NULs and whitespace, which some writers leave in the ASCII
/// payload, are ignored.
pub fn parse_exif_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim_end_matches('\0').trim();
    NaiveDateTime::parse_from_str(text, EXIF_DATETIME_FORMAT).ok()
}
