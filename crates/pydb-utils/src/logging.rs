//! # Logging Utilities
//!
//! Logging setup for tools built on pydb, using `tracing`.
//!
//! `pydb-core` only emits events; it never installs a subscriber. Host
//! debuggers and tests call one of the initializers here once at startup.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pydb_utils::init_logging;
//!
//! // Reads RUST_LOG, PYDB_LOG_FORMAT, and PYDB_LOG_FILE
//! init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("debugger attached");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: level filter (e.g. `RUST_LOG=pydb_core=trace`)
//! - `PYDB_LOG_FORMAT`: `pretty` (default) or `json`
//! - `PYDB_LOG_FILE`: optional log file; a directory gets a dated `pydb.log` inside it

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level, includes every remote read failure and iterator step
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// Initialize logging from the environment
///
/// ## Errors
///
/// Returns an error if a subscriber is already installed or the log file
/// directory cannot be created.
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = env::var("PYDB_LOG_FORMAT")
        .ok()
        .and_then(|s| LogFormat::from_str(&s).ok())
        .unwrap_or(LogFormat::Pretty);

    // A bare level in RUST_LOG becomes the default; directive lists are left to EnvFilter.
    let default_level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<LogLevel>().ok())
        .map_or(Level::INFO, Into::into);

    let log_file = env::var("PYDB_LOG_FILE").ok().map(PathBuf::from);
    init_logging_internal(format, default_level, log_file.as_deref())
}

/// Initialize logging with explicit level and format
///
/// `PYDB_LOG_FILE` is still honoured.
///
/// ```rust,no_run
/// use pydb_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// init_logging_with_level(LogLevel::Debug, LogFormat::Json).expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if a subscriber is already installed or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    let log_file = env::var("PYDB_LOG_FILE").ok().map(PathBuf::from);
    init_logging_internal(format, level.into(), log_file.as_deref())
}

/// Route events to the test harness's captured output
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Defaults to `trace` so failing tests show every remote read.
pub fn init_test_logging()
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(Level::TRACE))
        .with_test_writer()
        .with_target(true)
        .try_init();
}

/// Resolve `PYDB_LOG_FILE`: directories get a dated file name.
fn log_file_path(path: &Path) -> PathBuf
{
    if path.is_dir() {
        path.join(format!("{}-pydb.log", Utc::now().format("%Y-%m-%d")))
    } else {
        path.to_path_buf()
    }
}

fn file_layer<S>(path: &Path, format: LogFormat, filter: EnvFilter) -> Result<Box<dyn Layer<S> + Send + Sync>, LoggingError>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
{
    let path = log_file_path(path);
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, path.file_name().unwrap_or_default());
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // The writer must outlive every event; logging is process-wide.
    std::mem::forget(guard);

    let layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(false);

    Ok(match format {
        LogFormat::Pretty => layer.with_filter(filter).boxed(),
        LogFormat::Json => layer.json().with_current_span(true).with_filter(filter).boxed(),
    })
}

/// RUST_LOG can override the default level with more specific filters.
fn env_filter(default_level: Level) -> EnvFilter
{
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()))
}

fn init_logging_internal(format: LogFormat, default_level: Level, log_file: Option<&Path>) -> Result<(), LoggingError>
{
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(io::stderr);
    let console_layer = match format {
        LogFormat::Pretty => console_layer.with_ansi(true).with_filter(env_filter(default_level)).boxed(),
        LogFormat::Json => console_layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(env_filter(default_level))
            .boxed(),
    };

    let file = log_file
        .map(|path| file_layer(path, format, env_filter(default_level)))
        .transpose()?;

    Registry::default()
        .with(console_layer)
        .with(file)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Unknown log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Unknown log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    /// A subscriber is already installed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
