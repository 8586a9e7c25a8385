//! Error handling for timeload

use std::time::Duration;
use thiserror::Error;

/// Errors that abort the whole run
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The project manifest is missing or unparsable
    #[error("Couldn't read `package.json`: {0}")]
    Manifest(String),

    /// The host runtime could not be started
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (JSON, numbers, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new manifest error
    pub fn manifest<S: Into<String>>(message: S) -> Self {
        Self::Manifest(message.into())
    }

    /// Create a new runtime error
    pub fn runtime<S: Into<String>>(message: S) -> Self {
        Self::Runtime(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Manifest(_) => "MANIFEST",
            Self::Runtime(_) => "RUNTIME",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Manifest(_) => 1,
            Self::Config(_) | Self::Parse(_) => 2,
            Self::Runtime(_) => 3,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Manifest(msg) => {
                format!("Couldn't read `package.json`: {}\n\nSuggestion: Run timeload from a project root or pass --cwd <dir>.", msg)
            }
            Self::Runtime(msg) => {
                format!("Node.js runtime unavailable: {}\n\nSuggestion: Install Node.js or point --node / TIMELOAD_NODE at the binary.", msg)
            }
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.", msg)
            }
            other => other.to_string(),
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Parse(_) | Self::Manifest(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Runtime(_) | Self::Io(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

/// Failure of a single module load. Never aborts the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The module threw while loading
    #[error("{0}")]
    Module(String),

    /// The isolated worker exited without reporting a result
    #[error("Closed before getting the results.")]
    ClosedBeforeResult,

    /// A child process could not be spawned
    #[error("failed to spawn loader process: {0}")]
    Spawn(String),

    /// The host runtime went away mid-request
    #[error("host runtime exited: {0}")]
    HostExited(String),

    /// A child answered with something other than the expected reply
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The load exceeded the configured timeout
    #[error("load timed out after {0:?}")]
    Timeout(Duration),
}

impl LoadError {
    pub fn module<S: Into<String>>(message: S) -> Self {
        Self::Module(message.into())
    }

    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Self::Protocol(message.into())
    }

    /// Short machine readable tag, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Module(_) => "module",
            Self::ClosedBeforeResult => "closed_before_result",
            Self::Spawn(_) => "spawn",
            Self::HostExited(_) => "host_exited",
            Self::Protocol(_) => "protocol",
            Self::Timeout(_) => "timeout",
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

// Anyhow integration
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(format!("{:#}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for user feedback on fatal errors
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.format_error(error));
    }

    /// Render an error the way `report_error` prints it
    pub fn format_error(&self, error: &AppError) -> String {
        let mut out = error.format_for_console(self.use_color);
        if self.verbose {
            out.push_str("\n\n");
            out.push_str(&error.user_friendly_message());
        }
        out
    }
}
