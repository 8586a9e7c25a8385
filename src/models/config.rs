//! Configuration data model and validation

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Requested number of runs; values below 1 are clamped when timing
    #[serde(default = "default_runs")]
    pub runs: i64,

    /// Also time `devDependencies`
    #[serde(default)]
    pub include_dev: bool,

    /// Load every module in an isolated worker process
    #[serde(default)]
    pub force_isolated: bool,

    /// Directory holding the `package.json` to measure
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,

    /// Node.js executable used for the host runtime and workers
    #[serde(default = "default_node_binary")]
    pub node_binary: String,

    /// Optional per-load timeout; unlimited when unset
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Print the summary as JSON instead of a table
    #[serde(default)]
    pub json: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

/// Immutable parameters of one timing session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of runs, always at least 1
    pub runs: u32,
    pub include_dev: bool,
    pub force_isolated: bool,
}

impl RunConfig {
    /// Build a run configuration, clamping `runs` into `1..=u32::MAX`
    pub fn new(runs: i64, include_dev: bool, force_isolated: bool) -> Self {
        Self {
            runs: runs.clamp(1, u32::MAX as i64) as u32,
            include_dev,
            force_isolated,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(crate::defaults::DEFAULT_RUNS, false, false)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            include_dev: false,
            force_isolated: false,
            project_dir: default_project_dir(),
            node_binary: default_node_binary(),
            timeout_seconds: None,
            enable_color: default_enable_color(),
            json: false,
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-load timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Derive the immutable run configuration
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(self.runs, self.include_dev, self.force_isolated)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.node_binary.trim().is_empty() {
            return Err(AppError::config("Node binary cannot be empty"));
        }

        if !self.project_dir.is_dir() {
            return Err(AppError::config(format!(
                "Project directory does not exist: {}",
                self.project_dir.display()
            )));
        }

        if let Some(timeout) = self.timeout_seconds {
            if timeout == 0 {
                return Err(AppError::config("Timeout must be greater than 0"));
            }
            if timeout > crate::defaults::MAX_TIMEOUT_SECONDS {
                return Err(AppError::config(format!(
                    "Timeout cannot exceed {} seconds",
                    crate::defaults::MAX_TIMEOUT_SECONDS
                )));
            }
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(runs) = std::env::var("TIMELOAD_RUNS") {
            self.runs = runs.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TIMELOAD_RUNS value '{}': {}", runs, e)))?;
        }

        if let Ok(dev) = std::env::var("TIMELOAD_DEV") {
            self.include_dev = dev.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TIMELOAD_DEV value '{}': {}", dev, e)))?;
        }

        if let Ok(esm) = std::env::var("TIMELOAD_ESM") {
            self.force_isolated = esm.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TIMELOAD_ESM value '{}': {}", esm, e)))?;
        }

        if let Ok(node) = std::env::var("TIMELOAD_NODE") {
            self.node_binary = node.trim().to_string();
        }

        if let Ok(timeout) = std::env::var("TIMELOAD_TIMEOUT") {
            let secs = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TIMELOAD_TIMEOUT value '{}': {}", timeout, e)))?;
            self.timeout_seconds = Some(secs);
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_runs() -> i64 {
    crate::defaults::DEFAULT_RUNS
}

fn default_project_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_node_binary() -> String {
    crate::defaults::DEFAULT_NODE_BINARY.to_string()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.runs, 5);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_run_config_clamps_runs() {
        assert_eq!(RunConfig::new(0, false, false).runs, 1);
        assert_eq!(RunConfig::new(-3, false, false).runs, 1);
        assert_eq!(RunConfig::new(7, true, true).runs, 7);
        assert_eq!(RunConfig::new(i64::MAX, false, false).runs, u32::MAX);
        assert_eq!(RunConfig::default().runs, 5);
    }

    #[test]
    fn test_empty_node_binary_invalid() {
        let mut config = Config::default();
        config.node_binary = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_project_dir_invalid() {
        let mut config = Config::default();
        config.project_dir = PathBuf::from("/definitely/not/here/timeload");
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = Config::default();
        config.timeout_seconds = Some(0);
        assert!(config.validate().is_err());

        config.timeout_seconds = Some(601);
        assert!(config.validate().is_err());

        config.timeout_seconds = Some(30);
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_merge_from_env() {
        let _guard = crate::config::ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        std::env::set_var("TIMELOAD_RUNS", "3");
        std::env::set_var("TIMELOAD_DEV", "true");
        std::env::set_var("TIMELOAD_TIMEOUT", "12");

        let mut config = Config::default();
        let result = config.merge_from_env();

        std::env::remove_var("TIMELOAD_RUNS");
        std::env::remove_var("TIMELOAD_DEV");
        std::env::remove_var("TIMELOAD_TIMEOUT");

        assert!(result.is_ok());
        assert_eq!(config.runs, 3);
        assert!(config.include_dev);
        assert_eq!(config.timeout_seconds, Some(12));
    }

    #[test]
    fn test_merge_from_env_rejects_garbage() {
        let _guard = crate::config::ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        std::env::set_var("TIMELOAD_ESM", "maybe");
        let mut config = Config::default();
        let result = config.merge_from_env();
        std::env::remove_var("TIMELOAD_ESM");

        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
