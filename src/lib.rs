//! timeload
//!
//! Measures how long each dependency declared in a project's `package.json`
//! takes to load, averaged over repeated runs, and reports per-module and
//! aggregate timings.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod loader;
pub mod logging;
pub mod manifest;
pub mod models;
pub mod output;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, LoadError, Result};
pub use executor::{Eviction, Harness, HarnessObserver, Progress, SilentObserver};
pub use loader::{ModuleLoader, NodeLoader};
pub use manifest::Manifest;
pub use models::{Config, ModuleSet, RunConfig, Summary, SummaryRow, TimingRecord, TimingRecords};
pub use output::{OutputFormatter, ColoredFormatter, PlainFormatter, OutputFormatterFactory};
pub use stats::aggregate;
pub use types::{LoadStrategy, ModuleKind};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_RUNS: i64 = 5;
    pub const DEFAULT_NODE_BINARY: &str = "node";
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const MANIFEST_FILE: &str = "package.json";
    /// Packages under this scope only ship type declarations
    pub const TYPES_SCOPE_PREFIX: &str = "@types/";
    pub const MAX_TIMEOUT_SECONDS: u64 = 600;
    /// How long a fresh host runtime gets to answer its first ping
    pub const HANDSHAKE_TIMEOUT_SECONDS: u64 = 30;
}
