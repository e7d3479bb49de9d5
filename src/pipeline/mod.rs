//! Layer analysis pipeline: select, extract, then detect
//!
//! ```text
//! AnalyzerRegistry::required_files ─▶ TarExtractor ─▶ FileMap ─┬─▶ detect_os ─────▶ Os
//!                                                              └─▶ detect_packages ─▶ Vec<Package>
//! ```

mod orchestrator;

pub use orchestrator::{LayerAnalysis, LayerAnalyzer};
