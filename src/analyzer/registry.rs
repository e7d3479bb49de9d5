//! Analyzer registry

use super::{OsAnalyzer, PkgAnalyzer};
use crate::selector::FileSelection;
use std::sync::Arc;
use tracing::debug;

/// Ordered, append-only collection of analyzers
///
/// Built once during start-up and then shared (typically behind an `Arc`)
/// with the pipeline. There is no priority field: the order of `register_*`
/// calls is the order analyzers are tried in.
#[derive(Clone, Default)]
pub struct AnalyzerRegistry {
    os_analyzers: Vec<Arc<dyn OsAnalyzer>>,
    pkg_analyzers: Vec<Arc<dyn PkgAnalyzer>>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_os(&mut self, analyzer: Arc<dyn OsAnalyzer>) {
        debug!(
            analyzer = analyzer.name(),
            position = self.os_analyzers.len(),
            "Registered OS analyzer"
        );
        self.os_analyzers.push(analyzer);
    }

    pub fn register_pkg(&mut self, analyzer: Arc<dyn PkgAnalyzer>) {
        debug!(
            analyzer = analyzer.name(),
            position = self.pkg_analyzers.len(),
            "Registered package analyzer"
        );
        self.pkg_analyzers.push(analyzer);
    }

    pub fn os_analyzers(&self) -> impl Iterator<Item = &dyn OsAnalyzer> {
        self.os_analyzers.iter().map(|a| a.as_ref())
    }

    pub fn pkg_analyzers(&self) -> impl Iterator<Item = &dyn PkgAnalyzer> {
        self.pkg_analyzers.iter().map(|a| a.as_ref())
    }

    pub fn os_analyzer_names(&self) -> Vec<&str> {
        self.os_analyzers.iter().map(|a| a.name()).collect()
    }

    pub fn pkg_analyzer_names(&self) -> Vec<&str> {
        self.pkg_analyzers.iter().map(|a| a.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.os_analyzers.is_empty() && self.pkg_analyzers.is_empty()
    }

    /// Union of every registered analyzer's required files
    pub fn required_files(&self) -> FileSelection {
        let mut selection = FileSelection::new();
        for analyzer in &self.os_analyzers {
            selection.extend(analyzer.required_files());
        }
        for analyzer in &self.pkg_analyzers {
            selection.extend(analyzer.required_files());
        }
        selection
    }
}

impl std::fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerRegistry")
            .field("os_analyzers", &self.os_analyzer_names())
            .field("pkg_analyzers", &self.pkg_analyzer_names())
            .finish()
    }
}
