//! layerscan - OS and package detection for container image layers
//!
//! Given a directory holding a layer archive, layerscan extracts only the
//! files its registered analyzers care about and asks those analyzers, in
//! registration order, to recognize the operating system and the installed
//! package inventory. The result feeds a separate vulnerability matcher.
//!
//! # Core Concepts
//!
//! - **Analyzers**: pluggable [`OsAnalyzer`] / [`PkgAnalyzer`] implementations
//!   that declare their required files and parse a [`FileMap`]
//! - **Registry**: an explicit, append-only [`AnalyzerRegistry`]; the order of
//!   registration is the order of precedence
//! - **Selective extraction**: the [`TarExtractor`] streams a layer once and
//!   keeps only entries matching the registry's [`FileSelection`]
//! - **First match wins**: the [`LayerAnalyzer`] returns the first successful
//!   analyzer result, or a [`DetectionError`] when all of them miss
//!
//! # Example Usage
//!
//! ```ignore
//! use layerscan::{AnalyzerConfig, AnalyzerRegistry, LayerAnalyzer};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let mut registry = AnalyzerRegistry::new();
//! registry.register_os(Arc::new(DebianAnalyzer));
//! registry.register_pkg(Arc::new(DpkgAnalyzer));
//!
//! let analyzer = LayerAnalyzer::new(Arc::new(registry), AnalyzerConfig::from_env()?);
//! let files = analyzer.extract(Path::new("/tmp/layer"))?;
//! let os = analyzer.detect_os(&files)?;
//! let packages = analyzer.detect_packages(&files)?;
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod selector;
pub mod types;
pub mod util;

pub use analyzer::{AnalyzerError, AnalyzerRegistry, OsAnalyzer, PkgAnalyzer};
pub use config::{AnalyzerConfig, ConfigError};
pub use error::{DetectionError, ExtractionError};
pub use extractor::{Extractor, FileMap, TarExtractor};
pub use pipeline::{LayerAnalysis, LayerAnalyzer};
pub use selector::{FilePattern, FileSelection};
pub use types::{Os, Package};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
