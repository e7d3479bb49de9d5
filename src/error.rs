use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to turn a layer archive into a [`FileMap`](crate::FileMap)
///
/// Always fatal for the analysis call: no analyzer runs without a file map.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Layer archive does not exist: {0}")]
    ArchiveNotFound(PathBuf),
    #[error("Failed to open layer archive {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("Corrupt layer archive{}: {source}", entry_suffix(.entry))]
    Corrupt {
        entry: Option<String>,
        source: io::Error,
    },
    #[error("Entry {path} is {size} bytes, exceeding the {limit} byte limit")]
    EntryTooLarge { path: String, size: u64, limit: u64 },
    #[error("Extraction did not finish within {0:?}")]
    Timeout(Duration),
}

fn entry_suffix(entry: &Option<String>) -> String {
    match entry {
        Some(path) => format!(" at entry {}", path),
        None => String::new(),
    }
}

impl ExtractionError {
    /// The archive is absent ("no data") as opposed to present but unusable ("bad data")
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExtractionError::ArchiveNotFound(_))
    }

    pub(crate) fn corrupt(entry: Option<&str>, source: io::Error) -> Self {
        ExtractionError::Corrupt {
            entry: entry.map(str::to_string),
            source,
        }
    }
}

/// No registered analyzer recognized the layer
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionError {
    #[error("Unknown OS")]
    UnknownOs,
    #[error("Failed to analyze packages")]
    PackageAnalysis,
}
