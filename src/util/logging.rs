//! Structured logging setup.
//!
//! Logs always go to stderr: stdout carries the emitted unit document.
//!
//! - `GOSCAN_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//! - `GOSCAN_LOG_JSON`: one JSON object per log line (true/false)
//! - `RUST_LOG`: standard directives, replacing the defaults when set
//!
//! ```no_run
//! use goscan::util::logging;
//!
//! logging::init_from_env();
//! tracing::info!(root = "/src/app", "Scanning");
//! ```

use std::env;
use std::io;
use std::sync::Once;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "GOSCAN_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "GOSCAN_LOG_JSON";

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's own events
    pub level: Level,

    /// Emit JSON lines instead of human-readable text
    pub use_json: bool,

    /// Include the module target (e.g. goscan::pipeline) in logs
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
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

    /// Level from `GOSCAN_LOG_LEVEL`, JSON switch from `GOSCAN_LOG_JSON`.
    pub fn from_env() -> Self {
        let level = env::var(ENV_LOG_LEVEL)
            .map(|v| parse_level(&v))
            .unwrap_or(Level::INFO);

        let use_json = env::var(ENV_LOG_JSON)
            .ok()
            .and_then(|v| v.to_lowercase().parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            include_target: level >= Level::DEBUG,
        }
    }
}

/// Case-insensitive level name; unknown names fall back to INFO.
///
/// ```
/// use goscan::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
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
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    // RUST_LOG, when present, decides on its own
    if env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return filter;
    }

    match format!("goscan={}", level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Install the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_target(config.include_target),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(config.include_target),
                )
                .init();
        }
    });
}

pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}
