//! Structured logging setup for layerscan
//!
//! The library itself only emits `tracing` events. Embedding applications
//! and tests can use this module to install a subscriber.
//!
//! # Example
//!
//! ```no_run
//! use layerscan::util::logging;
//!
//! // Reads LAYERSCAN_LOG_LEVEL / LAYERSCAN_LOG_JSON, honors RUST_LOG
//! logging::init_from_env();
//!
//! tracing::info!(layer = "sha256:abc", "Scanning layer");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for `layerscan` events
    pub level: Level,

    /// Use JSON output format (for log shipping in production)
    pub use_json: bool,

    /// Include the module target (e.g., layerscan::pipeline) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name in logs
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with full metadata
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    /// Pretty console output at debug level, which shows every analyzer attempt
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

/// Parses a log level from a string, defaulting to `INFO`
///
/// ```
/// use layerscan::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("INFO"), Level::INFO);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(level: Level) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match format!("layerscan={}", level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Installs the global subscriber. Only the first call has any effect.
///
/// A subscriber installed earlier by the embedding application wins; this
/// call then leaves it in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        // Exactly one of the two formatters is present
        let json = config.use_json.then(|| {
            fmt::layer()
                .json()
                .with_target(config.include_target)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread_ids)
                .with_thread_names(config.include_thread_ids)
        });
        let pretty = (!config.use_json).then(|| {
            fmt::layer()
                .with_target(config.include_target)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread_ids)
                .with_thread_names(config.include_thread_ids)
        });

        if tracing_subscriber::registry()
            .with(build_filter(config.level))
            .with(json)
            .with(pretty)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global subscriber already set, keeping it");
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from `LAYERSCAN_LOG_LEVEL` and `LAYERSCAN_LOG_JSON`
pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}

impl LoggingConfig {
    /// Reads `LAYERSCAN_LOG_LEVEL` (default `info`) and `LAYERSCAN_LOG_JSON`
    /// (default `false`); everything else keeps its default
    pub fn from_env() -> Self {
        let level = env::var("LAYERSCAN_LOG_LEVEL")
            .map(|v| parse_level(&v))
            .unwrap_or(Level::INFO);

        let use_json = env::var("LAYERSCAN_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("info"), Level::INFO);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_case_insensitive() {
        assert_eq!(parse_level("TRACE"), Level::TRACE);
        assert_eq!(parse_level("Debug"), Level::DEBUG);
    }

    #[test]
    fn test_parse_level_invalid() {
        assert_eq!(parse_level("verbose"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_presets() {
        let production = LoggingConfig::production();
        assert!(production.use_json);
        assert!(production.include_location);

        let development = LoggingConfig::development();
        assert_eq!(development.level, Level::DEBUG);
        assert!(!development.use_json);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        env::set_var("LAYERSCAN_LOG_LEVEL", "warn");
        env::set_var("LAYERSCAN_LOG_JSON", "true");

        let config = LoggingConfig::from_env();
        assert_eq!(config.level, Level::WARN);
        assert!(config.use_json);
        assert!(!config.include_location);

        env::remove_var("LAYERSCAN_LOG_LEVEL");
        env::remove_var("LAYERSCAN_LOG_JSON");
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        env::remove_var("LAYERSCAN_LOG_LEVEL");
        env::set_var("LAYERSCAN_LOG_JSON", "not-a-bool");

        let config = LoggingConfig::from_env();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);

        env::remove_var("LAYERSCAN_LOG_JSON");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(LoggingConfig::development());
        init_default();
        tracing::info!(layer = "sha256:abc", "Logging after repeated init");
    }

    #[test]
    fn test_filter_scopes_crate_level() {
        let filter = build_filter(Level::DEBUG);
        assert!(filter.to_string().contains("layerscan=debug"));
    }
}
