use crate::analyzer::{AnalyzerError, AnalyzerRegistry};
use crate::config::AnalyzerConfig;
use crate::error::{DetectionError, ExtractionError};
use crate::extractor::{open_archive, Extractor, FileMap, TarExtractor};
use crate::types::{Os, Package};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of analyzing one layer
///
/// The two detections are independent: an unknown OS does not prevent the
/// package inventory from being reported, and vice versa.
#[derive(Debug)]
pub struct LayerAnalysis {
    pub os: Result<Os, DetectionError>,
    pub packages: Result<Vec<Package>, DetectionError>,
}

/// Runs registered analyzers against a layer archive
///
/// Analyzers are tried one at a time in registration order and the first
/// success wins. Analyzer errors never reach the caller; only exhaustion does.
pub struct LayerAnalyzer {
    registry: Arc<AnalyzerRegistry>,
    config: AnalyzerConfig,
    extractor: Arc<dyn Extractor>,
}

impl LayerAnalyzer {
    /// Creates an analyzer backed by a [`TarExtractor`] built from `config`
    ///
    /// # Arguments
    ///
    /// * `registry` - Analyzers to run, in the order they were registered
    /// * `config` - Layer file name, size cap and deadlines
    ///
    /// # Example
    ///
    /// ```
    /// use layerscan::{AnalyzerConfig, AnalyzerRegistry, LayerAnalyzer};
    /// use std::sync::Arc;
    ///
    /// let config = AnalyzerConfig {
    ///     layer_file_name: "layer.tar.gz".to_string(),
    ///     ..Default::default()
    /// };
    /// let analyzer = LayerAnalyzer::new(Arc::new(AnalyzerRegistry::new()), config);
    /// assert_eq!(analyzer.config().layer_file_name, "layer.tar.gz");
    /// assert!(analyzer.registry().is_empty());
    /// ```
    pub fn new(registry: Arc<AnalyzerRegistry>, config: AnalyzerConfig) -> Self {
        let extractor = TarExtractor::new()
            .with_max_file_size(config.max_file_size)
            .with_timeout(config.extraction_timeout);
        Self {
            registry,
            config,
            extractor: Arc::new(extractor),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn registry(&self) -> &AnalyzerRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Extract the files any registered analyzer needs from `dir/<layer file>`
    ///
    /// Only entries matching [`AnalyzerRegistry::required_files`] are kept.
    /// A missing archive is [`ExtractionError::ArchiveNotFound`]; use
    /// [`ExtractionError::is_not_found`] to treat it as "no data".
    ///
    /// # Example
    ///
    /// ```no_run
    /// use layerscan::{AnalyzerConfig, AnalyzerRegistry, LayerAnalyzer};
    /// use std::path::Path;
    /// use std::sync::Arc;
    ///
    /// let analyzer = LayerAnalyzer::new(Arc::new(AnalyzerRegistry::new()), AnalyzerConfig::default());
    /// match analyzer.extract(Path::new("/var/lib/scanner/layers/sha256-abc")) {
    ///     Ok(files) => println!("{} files retained", files.len()),
    ///     Err(e) if e.is_not_found() => println!("layer has no archive"),
    ///     Err(e) => eprintln!("extraction failed: {}", e),
    /// }
    /// ```
    pub fn extract(&self, dir: &Path) -> Result<FileMap, ExtractionError> {
        let archive_path = dir.join(&self.config.layer_file_name);
        let selection = self.registry.required_files();
        info!(
            archive = %archive_path.display(),
            patterns = selection.len(),
            "Extracting layer"
        );

        let mut archive = open_archive(&archive_path)?;
        let files = self.extractor.extract_files(&mut archive, &selection)?;

        info!(retained = files.len(), "Layer extracted");
        Ok(files)
    }

    /// Runs OS analyzers in registration order and returns the first success
    ///
    /// Returns [`DetectionError::UnknownOs`] when every analyzer declines.
    ///
    /// # Example
    ///
    /// ```
    /// use layerscan::{
    ///     AnalyzerConfig, AnalyzerError, AnalyzerRegistry, DetectionError, FileMap, FilePattern,
    ///     LayerAnalyzer, Os, OsAnalyzer,
    /// };
    /// use std::sync::Arc;
    ///
    /// struct Alpine;
    ///
    /// impl OsAnalyzer for Alpine {
    ///     fn name(&self) -> &str {
    ///         "alpine"
    ///     }
    ///
    ///     fn required_files(&self) -> Vec<FilePattern> {
    ///         vec![FilePattern::exact("etc/alpine-release")]
    ///     }
    ///
    ///     fn analyze(&self, files: &FileMap) -> Result<Os, AnalyzerError> {
    ///         let release = files
    ///             .get_str("etc/alpine-release")
    ///             .ok_or_else(|| AnalyzerError::missing("etc/alpine-release"))?;
    ///         Ok(Os::new(release.trim(), "alpine"))
    ///     }
    /// }
    ///
    /// let mut registry = AnalyzerRegistry::new();
    /// registry.register_os(Arc::new(Alpine));
    /// let analyzer = LayerAnalyzer::new(Arc::new(registry), AnalyzerConfig::default());
    ///
    /// let files: FileMap = vec![("etc/alpine-release", "3.10.3\n")].into_iter().collect();
    /// assert_eq!(analyzer.detect_os(&files), Ok(Os::new("3.10.3", "alpine")));
    /// assert_eq!(analyzer.detect_os(&FileMap::new()), Err(DetectionError::UnknownOs));
    /// ```
    pub fn detect_os(&self, files: &FileMap) -> Result<Os, DetectionError> {
        for analyzer in self.registry.os_analyzers() {
            let started = Instant::now();
            let result = analyzer.analyze(files);
            self.record_attempt("os", analyzer.name(), started.elapsed(), result.as_ref().err());

            if let Ok(os) = result {
                info!(analyzer = analyzer.name(), os = %os, "Detected OS");
                return Ok(os);
            }
        }

        warn!("No OS analyzer matched the layer");
        Err(DetectionError::UnknownOs)
    }

    /// Runs package analyzers in registration order and returns the first success
    ///
    /// A malformed database is logged and the next analyzer is tried.
    /// Returns [`DetectionError::PackageAnalysis`] when every analyzer declines.
    ///
    /// # Example
    ///
    /// ```
    /// use layerscan::{
    ///     AnalyzerConfig, AnalyzerError, AnalyzerRegistry, DetectionError, FileMap, FilePattern,
    ///     LayerAnalyzer, Package, PkgAnalyzer,
    /// };
    /// use std::sync::Arc;
    ///
    /// struct Apk;
    ///
    /// impl PkgAnalyzer for Apk {
    ///     fn name(&self) -> &str {
    ///         "apk"
    ///     }
    ///
    ///     fn required_files(&self) -> Vec<FilePattern> {
    ///         vec![FilePattern::exact("lib/apk/db/installed")]
    ///     }
    ///
    ///     fn analyze(&self, files: &FileMap) -> Result<Vec<Package>, AnalyzerError> {
    ///         let db = files
    ///             .get_str("lib/apk/db/installed")
    ///             .ok_or_else(|| AnalyzerError::missing("lib/apk/db/installed"))?;
    ///         Ok(db
    ///             .lines()
    ///             .filter_map(|line| line.strip_prefix("P:"))
    ///             .map(|name| Package::new(name, "", ""))
    ///             .collect())
    ///     }
    /// }
    ///
    /// let mut registry = AnalyzerRegistry::new();
    /// registry.register_pkg(Arc::new(Apk));
    /// let analyzer = LayerAnalyzer::new(Arc::new(registry), AnalyzerConfig::default());
    ///
    /// let files: FileMap = vec![("lib/apk/db/installed", "P:musl\nV:1.1.24-r2\n")]
    ///     .into_iter()
    ///     .collect();
    /// assert_eq!(analyzer.detect_packages(&files).unwrap().len(), 1);
    /// assert_eq!(
    ///     analyzer.detect_packages(&FileMap::new()),
    ///     Err(DetectionError::PackageAnalysis)
    /// );
    /// ```
    pub fn detect_packages(&self, files: &FileMap) -> Result<Vec<Package>, DetectionError> {
        for analyzer in self.registry.pkg_analyzers() {
            let started = Instant::now();
            let result = analyzer.analyze(files);
            self.record_attempt(
                "package",
                analyzer.name(),
                started.elapsed(),
                result.as_ref().err(),
            );

            if let Ok(packages) = result {
                info!(
                    analyzer = analyzer.name(),
                    count = packages.len(),
                    "Detected packages"
                );
                return Ok(packages);
            }
        }

        warn!("No package analyzer matched the layer");
        Err(DetectionError::PackageAnalysis)
    }

    /// Extract once, then run both detections
    pub fn analyze(&self, dir: &Path) -> Result<LayerAnalysis, ExtractionError> {
        let files = self.extract(dir)?;
        Ok(LayerAnalysis {
            os: self.detect_os(&files),
            packages: self.detect_packages(&files),
        })
    }

    fn record_attempt(
        &self,
        kind: &'static str,
        analyzer: &str,
        elapsed: Duration,
        error: Option<&AnalyzerError>,
    ) {
        let elapsed_ms = elapsed.as_millis() as u64;
        if elapsed > self.config.slow_analyzer_threshold {
            warn!(kind, analyzer, elapsed_ms, "Slow analyzer");
        }

        match error {
            None => debug!(kind, analyzer, elapsed_ms, "Analyzer matched"),
            Some(e) if e.is_malformed() => {
                warn!(kind, analyzer, error = %e, "Analyzer found malformed data, trying next")
            }
            Some(e) => debug!(kind, analyzer, reason = %e, "Analyzer not applicable"),
        }
    }
}
