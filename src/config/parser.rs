//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    models::Config,
    error::Result,
    config::env::EnvManager,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        if let Some(ref dir) = self.cli.cwd {
            config.project_dir = dir.clone();
        }

        // The .env file lives next to package.json
        EnvManager::load_env_file(&config.project_dir, self.cli.debug)?;

        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(runs) = self.cli.runs {
            config.runs = runs;
        }

        // Flags can only switch features on
        if self.cli.dev {
            config.include_dev = true;
        }
        if self.cli.esm {
            config.force_isolated = true;
        }

        if let Some(ref node) = self.cli.node {
            config.node_binary = node.clone();
        }

        if self.cli.timeout.is_some() {
            config.timeout_seconds = self.cli.timeout;
        }

        if !self.cli.use_colors() {
            config.enable_color = false;
        }

        config.json = self.cli.json;
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    let parser = ConfigParser::new(cli);
    parser.parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let run_config = config.run_config();
    let mut summary = Vec::new();

    summary.push(format!("Project: {}", config.project_dir.display()));
    summary.push(format!("Runs: {}", run_config.runs));
    summary.push(format!("Include devDependencies: {}", run_config.include_dev));
    summary.push(format!("Force isolated loads: {}", run_config.force_isolated));
    summary.push(format!("Node binary: {}", config.node_binary));
    summary.push(format!(
        "Load timeout: {}",
        config.timeout_seconds.map(|s| format!("{}s", s)).unwrap_or_else(|| "none".to_string())
    ));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    for (var, _, _) in EnvManager::get_supported_env_vars() {
        if let Ok(value) = std::env::var(var) {
            summary.push(format!("Environment: {}={}", var, value));
        }
    }

    summary.join("\n")
}
