//! Logging infrastructure for cli-search.
//!
//! This module initializes the tracing subscriber for structured logging.
//! All logs are emitted to stderr to keep stdout clean for the answer.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::{fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Diagnostic verbosity accepted on the command line.
///
/// Mirrors the classic five-level scheme. `Critical` has no tracing
/// equivalent and maps to the `error` filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// All levels, in increasing severity.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    /// The `EnvFilter` directive for this level.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(AppError::Config(format!(
                "Unknown log level: {}. Supported: DEBUG, INFO, WARNING, ERROR, CRITICAL",
                other
            ))),
        }
    }
}

/// Pick the log filter directive for this run.
///
/// Precedence: the command-line level, then `RUST_LOG`, then the config
/// file, then `warn`. A config value that is not one of the named levels is
/// used as a raw `EnvFilter` directive.
pub fn resolve_filter(
    cli_level: Option<LogLevel>,
    rust_log: Option<&str>,
    config_level: Option<&str>,
) -> String {
    if let Some(level) = cli_level {
        return level.as_filter().to_string();
    }

    if let Some(directive) = rust_log.map(str::trim).filter(|d| !d.is_empty()) {
        return directive.to_string();
    }

    match config_level.map(str::trim).filter(|l| !l.is_empty()) {
        Some(level) => level
            .parse::<LogLevel>()
            .map(|l| l.as_filter().to_string())
            .unwrap_or_else(|_| level.to_string()),
        None => LogLevel::default().as_filter().to_string(),
    }
}

/// Initialize the tracing subscriber with stderr output.
///
/// This sets up structured logging with:
/// - Output to stderr (stdout is reserved for the answer)
/// - Filtering from the provided directive, falling back to `RUST_LOG`, then `warn`
/// - Optional ANSI color control
///
/// # Arguments
/// * `filter` - Optional filter directive override (e.g., "debug", "clisearch_web=trace")
/// * `no_color` - Disable colored output
///
/// # Example
/// ```no_run
/// use clisearch_core::logging::init_logging;
///
/// init_logging(Some("info"), false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(filter: Option<&str>, no_color: bool) -> AppResult<()> {
    let default_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let filter_str = filter.unwrap_or(&default_level);

    let env_filter = EnvFilter::try_new(filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter: {}", e)))?;

    let fmt_layer = tracing_fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(!no_color && supports_color());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;

    Ok(())
}

/// Check if the terminal supports color output.
fn supports_color() -> bool {
    std::env::var("NO_COLOR").map_or(true, |v| v.is_empty())
}
