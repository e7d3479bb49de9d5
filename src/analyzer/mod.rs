//! Pluggable OS and package analyzers
//!
//! Concrete analyzers (os-release parsers, dpkg/apk/rpm database readers, ...)
//! live outside this crate. They implement [`OsAnalyzer`] or [`PkgAnalyzer`]
//! and are appended to an [`AnalyzerRegistry`]; registration order decides
//! which analyzer wins when several could match.

mod registry;

pub use registry::AnalyzerRegistry;

use crate::extractor::FileMap;
use crate::selector::FilePattern;
use crate::types::{Os, Package};
use thiserror::Error;

/// Why an analyzer did not produce a result
///
/// Both variants make the orchestrator move on to the next analyzer. The
/// split only controls how loudly the miss is logged.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The format this analyzer understands is not present in the layer
    #[error("Not applicable: {0}")]
    NotApplicable(String),
    /// The format is present but could not be parsed
    #[error("Malformed {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AnalyzerError {
    pub fn missing(path: &str) -> Self {
        AnalyzerError::NotApplicable(format!("{} not found", path))
    }

    pub fn malformed(path: &str, source: impl Into<anyhow::Error>) -> Self {
        AnalyzerError::Malformed {
            path: path.to_string(),
            source: source.into(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, AnalyzerError::Malformed { .. })
    }
}

/// Recognizes the operating system of a layer
pub trait OsAnalyzer: Send + Sync {
    /// Short identifier used in logs (e.g. "debian")
    fn name(&self) -> &str;

    /// Every file this analyzer may read. Must stay stable for the process lifetime.
    fn required_files(&self) -> Vec<FilePattern>;

    /// Pure function of `files`; must return an error rather than a partial [`Os`]
    fn analyze(&self, files: &FileMap) -> Result<Os, AnalyzerError>;
}

/// Recognizes an installed-package database
pub trait PkgAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    fn required_files(&self) -> Vec<FilePattern>;

    /// Dedup policy for repeated package names belongs here, not in the orchestrator
    fn analyze(&self, files: &FileMap) -> Result<Vec<Package>, AnalyzerError>;
}
