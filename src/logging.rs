//! Structured logging for timeload
//!
//! Console output mirrors a minimal `LEVEL message` style; `--debug`
//! switches to one JSON object per line with timestamps, the session id and
//! source locations. Warnings and errors always go to stderr, and with
//! `--json` everything does, so stdout carries only the report.

use crate::error::{AppError, LoadError, Result};
use crate::executor::Progress;
use crate::loader::Decision;
use crate::models::{Config, Summary};
use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general application information
    Info = 2,
    /// Warning level - a module was dropped, the run continues
    Warn = 3,
    /// Error level - the run cannot continue
    Error = 4,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Terminal color for the level name
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::White,
            LogLevel::Debug => Color::Cyan,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when log entry was created
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Additional structured fields
    pub fields: BTreeMap<String, serde_json::Value>,
    /// File and line information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LogLocation>,
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// `LEVEL message`
    Console,
    /// JSON format for structured logging
    Json,
    /// Compact single-line format with a timestamp
    Compact,
}

/// Shared logging context for session tracking
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    context_fields: BTreeMap<String, serde_json::Value>,
}

/// Logger implementation with multiple output formats
pub struct Logger {
    /// Minimum log level to output
    min_level: LogLevel,
    use_color: bool,
    /// Append structured fields to console lines
    show_fields: bool,
    include_location: bool,
    format: LogFormat,
    name: String,
    /// Route every level to stderr
    stderr_only: bool,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            show_fields: false,
            include_location: false,
            format: LogFormat::Console,
            name,
            stderr_only: false,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger with specific configuration
    pub fn with_config(name: String, config: &Config) -> Self {
        Self {
            min_level: if config.debug { LogLevel::Debug } else { LogLevel::Info },
            use_color: config.enable_color && !config.json,
            show_fields: config.verbose || config.debug,
            include_location: config.debug,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name,
            stderr_only: config.json,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Add context field for all subsequent log entries
    pub async fn add_context_field<T: Serialize>(&self, key: String, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            let mut context = self.context.write().await;
            context.context_fields.insert(key, json_value);
        }
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Write log entry to output
    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        let context = self.context.read().await;
        if let Some(session_id) = &context.session_id {
            entry
                .fields
                .insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
        }
        for (key, value) in &context.context_fields {
            entry.fields.insert(key.clone(), value.clone());
        }
        drop(context);

        let output = self.render(&entry);

        if self.stderr_only || entry.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr(), "{}", output);
        } else {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }

    /// Format an entry according to the configured format
    pub fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
            LogFormat::Compact => self.format_compact(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let level = entry.level.as_str();
        let level = if self.use_color {
            level.color(entry.level.color()).to_string()
        } else {
            level.to_string()
        };

        let mut output = format!("{} {}", level, entry.message);

        // The session id only matters in machine readable output
        let fields: Vec<String> = entry
            .fields
            .iter()
            .filter(|(k, _)| k.as_str() != "session_id")
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if self.show_fields && !fields.is_empty() {
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => serde_json::json!({
                "error": "Failed to serialize log entry",
                "message": entry.message,
            })
            .to_string(),
        }
    }

    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!(
            "{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                fields: BTreeMap::new(),
                location: None,
            },
        }
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add location information
    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_exit_code", error.exit_code())
    }

    /// Add per-module load failure information
    pub fn load_error(self, error: &LoadError) -> Self {
        self.field("error_kind", error.kind())
    }

    /// The entry as built so far
    pub fn entry(&self) -> &LogEntry {
        &self.entry
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Specialized logger for module load events
pub struct LoadEventLogger {
    logger: Logger,
}

impl LoadEventLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("LOAD".to_string(), config),
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn log_session_start(&self, modules: usize, runs: u32, force_isolated: bool) {
        self.logger
            .debug(&format!("Timing {} module(s) over {} run(s)", modules, runs))
            .field("modules", modules)
            .field("runs", runs)
            .field("force_isolated", force_isolated)
            .log()
            .await;
    }

    pub async fn log_decision(&self, module: &str, path: &str, decision: &Decision) {
        self.logger
            .debug(&format!("{} -> {}", module, decision.strategy))
            .field("module", module)
            .field("path", path)
            .field("strategy", decision.strategy)
            .field("reason", format!("{:?}", decision.reason))
            .log()
            .await;
    }

    pub async fn log_sample(&self, progress: &Progress<'_>) {
        self.logger
            .debug(&format!("{} loaded in {}ns", progress.module, progress.nanos))
            .field("module", progress.module)
            .field("run", progress.run)
            .field("nanos", progress.nanos)
            .field("strategy", progress.strategy)
            .log()
            .await;
    }

    /// A module failed and was dropped from the whole session
    pub async fn log_eviction(&self, module: &str, run: u32, error: &LoadError) {
        self.logger
            .warn(&format!("{}: {}", module, error))
            .field("module", module)
            .field("run", run)
            .load_error(error)
            .log()
            .await;
    }

    pub async fn log_session_end(&self, summary: &Summary, attempts: usize, host_restarts: u32) {
        self.logger
            .debug(&format!(
                "Finished: {} module(s) reported, {} load(s) attempted",
                summary.rows.len(),
                attempts
            ))
            .field("reported", summary.rows.len())
            .field("attempts", attempts)
            .field("total_nanos", summary.total_nanos)
            .field("host_restarts", host_restarts)
            .log()
            .await;
    }
}

/// Creates loggers that share one session id
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger with a specific name
    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_load_logger(&self) -> LoadEventLogger {
        let load = LoadEventLogger::new(&self.config);
        load.logger.set_session_id(self.session_id.clone()).await;
        load
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Convenience macros for logging with location information
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}
