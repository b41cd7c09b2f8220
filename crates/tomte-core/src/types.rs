//! Core data types produced by the fingerprinting pipeline.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::PipelineError;

/// Placeholder timestamp for files without a usable capture date.
///
/// Fixed at 1900-01-01 00:00:00, well before any digital camera. Consumers
/// must read it as "no date available", never as a real capture time.
pub static UNKNOWN_DATE: LazyLock<NaiveDateTime> = LazyLock::new(|| {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .unwrap_or_default()
        .and_time(NaiveTime::default())
});

/// The result of fingerprinting one image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    /// Path used to read the file
    pub path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// Capture date from EXIF, or [`UNKNOWN_DATE`]
    pub timestamp: NaiveDateTime,

    /// Lowercase hex SHA-1 of the re-encoded pixel payload
    pub fingerprint: String,
}

impl FileResult {
    /// Whether the timestamp came from the file rather than the sentinel.
    pub fn has_known_date(&self) -> bool {
        self.timestamp != *UNKNOWN_DATE
    }
}

impl fmt::Display for FileResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -- {} -- {}",
            self.file_name,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.fingerprint
        )
    }
}

/// A file that could not be fingerprinted.
#[derive(Debug)]
pub struct FileFailure {
    /// Path used to read the file
    pub path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// Why the unit failed
    pub error: PipelineError,
}

/// Terminal state of one unit of work.
#[derive(Debug)]
pub enum FileOutcome {
    Completed(FileResult),
    Failed(FileFailure),
}

impl FileOutcome {
    /// Wrap a pipeline error as a failed outcome for `path`.
    pub fn failed(path: &Path, error: PipelineError) -> Self {
        FileOutcome::Failed(FileFailure {
            path: path.to_path_buf(),
            file_name: display_name(path),
            error,
        })
    }

    /// The input path this outcome belongs to.
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Completed(result) => &result.path,
            FileOutcome::Failed(failure) => &failure.path,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, FileOutcome::Completed(_))
    }
}

/// The filename portion of a path, for display.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
