//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

/// timeload - measure how long each dependency in package.json takes to load
#[derive(Parser, Debug, Clone)]
#[command(name = "timeload")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Number of runs to average over, 5 by default (values below 1 are treated as 1)
    #[arg(short, long, allow_negative_numbers = true, value_name = "N")]
    pub runs: Option<i64>,

    /// Include devDependencies
    #[arg(long)]
    pub dev: bool,

    /// Load every module in an isolated worker process
    #[arg(long)]
    pub esm: bool,

    /// Project directory containing package.json
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Node.js executable to use
    #[arg(long, value_name = "PATH")]
    pub node: Option<String>,

    /// Abort a single load after this many seconds (no limit by default)
    #[arg(short, long, value_parser = parse_timeout, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.no_color || self.json {
            false
        } else {
            supports_color()
        }
    }
}

/// Parse a timeout in whole seconds
fn parse_timeout(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid timeout: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid timeout: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Timeout must be greater than 0".to_string())
            } else if secs > crate::defaults::MAX_TIMEOUT_SECONDS {
                Err(format!(
                    "Timeout cannot exceed {} seconds",
                    crate::defaults::MAX_TIMEOUT_SECONDS
                ))
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["timeload"]);
        assert_eq!(cli.runs, None);
        assert!(!cli.dev);
        assert!(!cli.esm);
        assert!(cli.cwd.is_none());
        assert!(cli.timeout.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "timeload",
            "--runs", "10",
            "--dev",
            "--esm",
            "--cwd", "/tmp/project",
            "--node", "/usr/local/bin/node",
            "--timeout", "30",
            "--json",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.runs, Some(10));
        assert!(cli.dev);
        assert!(cli.esm);
        assert_eq!(cli.cwd, Some(PathBuf::from("/tmp/project")));
        assert_eq!(cli.node.as_deref(), Some("/usr/local/bin/node"));
        assert_eq!(cli.timeout, Some(30));
        assert!(cli.json);
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(cli.debug);
    }

    #[test]
    fn test_cli_accepts_non_positive_runs() {
        let cli = Cli::parse_from(["timeload", "--runs", "0"]);
        assert_eq!(cli.runs, Some(0));
        let cli = Cli::parse_from(["timeload", "--runs", "-2"]);
        assert_eq!(cli.runs, Some(-2));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("10"), Ok(10));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("601").is_err());
        assert!(parse_timeout("+5").is_err());
        assert!(parse_timeout("abc").is_err());
    }

    #[test]
    fn test_json_disables_colors() {
        let cli = Cli::parse_from(["timeload", "--json"]);
        assert!(!cli.use_colors());
        let cli = Cli::parse_from(["timeload", "--no-color"]);
        assert!(!cli.use_colors());
    }
}
