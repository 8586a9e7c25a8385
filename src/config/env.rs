//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `<project_dir>/.env` if it exists. Variables already set win.
    pub fn load_env_file(project_dir: &Path, debug: bool) -> Result<()> {
        let env_path = project_dir.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path)
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", env_path.display());
            }
        } else if debug {
            eprintln!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("TIMELOAD_RUNS", "Number of runs to average over", "5"),
            ("TIMELOAD_DEV", "Include devDependencies", "false"),
            ("TIMELOAD_ESM", "Load every module in an isolated worker", "false"),
            ("TIMELOAD_NODE", "Node.js executable", "/usr/local/bin/node"),
            ("TIMELOAD_TIMEOUT", "Per-load timeout in seconds (1-600)", "30"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }
}
