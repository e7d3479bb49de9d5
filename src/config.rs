//! Configuration for layer analysis
//!
//! Settings come from environment variables with defaults for anything unset.
//!
//! # Environment Variables
//!
//! - `LAYERSCAN_LAYER_FILE`: archive file name inside the layer directory - default: "layer.tar"
//! - `LAYERSCAN_MAX_FILE_SIZE`: largest selected entry in bytes - default: 67108864 (64MB)
//! - `LAYERSCAN_EXTRACTION_TIMEOUT`: extraction deadline in seconds, 0 disables - default: 0
//! - `LAYERSCAN_SLOW_ANALYZER_MS`: analyzer run time reported as slow - default: 1000
//! - `LAYERSCAN_LOG_LEVEL` / `LAYERSCAN_LOG_JSON`: see [`crate::util::logging`]

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_LAYER_FILE_NAME: &str = "layer.tar";
const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;
const DEFAULT_SLOW_ANALYZER_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Archive opened relative to the directory handed to the pipeline
    pub layer_file_name: String,
    pub max_file_size: u64,
    pub extraction_timeout: Option<Duration>,
    pub slow_analyzer_threshold: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            layer_file_name: DEFAULT_LAYER_FILE_NAME.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            extraction_timeout: None,
            slow_analyzer_threshold: Duration::from_millis(DEFAULT_SLOW_ANALYZER_MS),
        }
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::ParseError {
                field: key.to_string(),
                error: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

impl AnalyzerConfig {
    /// Load from `LAYERSCAN_*` variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let layer_file_name = env::var("LAYERSCAN_LAYER_FILE")
            .map(|v| v.trim().to_string())
            .unwrap_or(defaults.layer_file_name);

        let max_file_size =
            parse_env::<u64>("LAYERSCAN_MAX_FILE_SIZE")?.unwrap_or(defaults.max_file_size);

        let extraction_timeout = match parse_env::<u64>("LAYERSCAN_EXTRACTION_TIMEOUT")? {
            Some(0) | None => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        let slow_analyzer_threshold = parse_env::<u64>("LAYERSCAN_SLOW_ANALYZER_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.slow_analyzer_threshold);

        let config = Self {
            layer_file_name,
            max_file_size,
            extraction_timeout,
            slow_analyzer_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layer_file_name.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "layer file name must not be empty".to_string(),
            ));
        }
        if self.layer_file_name.contains('/') || self.layer_file_name.contains('\\') {
            return Err(ConfigError::ValidationFailed(format!(
                "layer file name must be a bare file name, got {}",
                self.layer_file_name
            )));
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "max file size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Layerscan Configuration:")?;
        writeln!(f, "  Layer File: {}", self.layer_file_name)?;
        writeln!(f, "  Max File Size: {} bytes", self.max_file_size)?;
        match self.extraction_timeout {
            Some(timeout) => writeln!(f, "  Extraction Timeout: {}s", timeout.as_secs())?,
            None => writeln!(f, "  Extraction Timeout: none")?,
        }
        writeln!(
            f,
            "  Slow Analyzer Threshold: {}ms",
            self.slow_analyzer_threshold.as_millis()
        )?;
        Ok(())
    }
}
