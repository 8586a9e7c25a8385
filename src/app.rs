//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config},
    error::{AppError, Result},
    executor::{Eviction, Harness, HarnessObserver, Progress},
    loader::{Decision, LoaderOptions, NodeLoader},
    log_debug, log_info,
    logging::{LoadEventLogger, LoggerFactory},
    manifest::Manifest,
    models::Config,
    output::{CursorGuard, JsonReport, OutputFormatter, OutputFormatterFactory},
};
use async_trait::async_trait;
use std::io::{Stdout, Write};

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
}

/// Forwards harness events to the progress line and the load logger
struct TerminalObserver<'a> {
    formatter: &'a dyn OutputFormatter,
    cursor: &'a mut CursorGuard<Stdout>,
    events: &'a LoadEventLogger,
}

#[async_trait]
impl<'a> HarnessObserver for TerminalObserver<'a> {
    async fn on_decision(&mut self, module: &str, path: &str, decision: &Decision) {
        self.events.log_decision(module, path, decision).await;
    }

    async fn on_sample(&mut self, progress: Progress<'_>) {
        self.cursor.progress(&self.formatter.format_progress(&progress));
        self.events.log_sample(&progress).await;
    }

    async fn on_evicted(&mut self, eviction: Eviction<'_>) {
        self.cursor.persist(&self.formatter.format_failure(&eviction));
        self.events
            .log_eviction(eviction.module, eviction.run, eviction.error)
            .await;
    }
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Load configuration from CLI arguments, `.env` and the environment
    pub fn from_cli(cli: Cli) -> Result<Self> {
        Ok(Self::new(load_config(cli)?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the application
    pub async fn run(self) -> Result<()> {
        let config = self.config;
        let factory = LoggerFactory::new(config.clone());
        let logger = factory.create_logger("TIMELOAD").await;
        let events = factory.create_load_logger().await;

        if config.debug {
            log_debug!(
                logger,
                "{} v{} ({}, built {}, commit {})",
                crate::PKG_NAME,
                crate::VERSION,
                crate::TARGET_TRIPLE,
                crate::BUILD_TIME,
                crate::GIT_COMMIT
            );
            for line in display_config_summary(&config).lines() {
                log_debug!(logger, "{}", line);
            }
        }

        let manifest = Manifest::load(&config.project_dir)?;
        let modules = manifest.module_names(config.include_dev);

        if modules.is_empty() {
            log_info!(logger, "No dependencies found.");
            return Ok(());
        }

        let loader = NodeLoader::start(LoaderOptions::from_config(&config)).await?;
        logger
            .add_context_field("node_version".to_string(), loader.node_version())
            .await;
        log_debug!(logger, "Using node {}", loader.node_version());

        let run_config = config.run_config();
        events
            .log_session_start(modules.len(), run_config.runs, run_config.force_isolated)
            .await;

        let formatter = OutputFormatterFactory::create_formatter(config.enable_color, config.verbose);
        let mut cursor = CursorGuard::stdout(!config.json);
        let mut harness = Harness::new(loader, run_config, modules);

        {
            let mut observer = TerminalObserver {
                formatter: formatter.as_ref(),
                cursor: &mut cursor,
                events: &events,
            };

            tokio::select! {
                _ = harness.run(&mut observer) => {}
                _ = tokio::signal::ctrl_c() => {
                    return Err(AppError::runtime("Interrupted, partial results discarded"));
                }
            }
        }

        let summary = harness.summary();
        events
            .log_session_end(&summary, harness.attempts(), harness.loader().host_restarts())
            .await;

        cursor.clear_line();
        if config.json {
            let report = JsonReport::new(&summary, harness.evicted(), Some(harness.loader().node_version()));
            println!("{}", report.to_json()?);
        } else {
            print_report(formatter.as_ref(), &summary)?;
        }
        drop(cursor);

        harness.into_loader().shutdown().await;
        Ok(())
    }
}

fn print_report(formatter: &dyn OutputFormatter, summary: &crate::models::Summary) -> Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(formatter.format_report(summary).as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir) -> Config {
        Config {
            project_dir: dir.path().to_path_buf(),
            enable_color: false,
            node_binary: "timeload-no-such-node-binary".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_manifest_is_manifest_error() {
        let dir = TempDir::new().unwrap();
        let err = App::new(config_for(&dir)).run().await.unwrap_err();
        assert!(matches!(err, AppError::Manifest(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_unparsable_manifest_is_manifest_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        let err = App::new(config_for(&dir)).run().await.unwrap_err();
        assert!(matches!(err, AppError::Manifest(_)));
    }

    #[tokio::test]
    async fn test_no_dependencies_never_starts_runtime() {
        // The node binary does not exist, so reaching the loader would fail
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies": {"@types/node": "^20.0.0"}}"#,
        )
        .unwrap();
        assert!(App::new(config_for(&dir)).run().await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_runtime_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"dependencies": {"ms": "^2.1.3"}}"#).unwrap();
        let err = App::new(config_for(&dir)).run().await.unwrap_err();
        assert!(matches!(err, AppError::Runtime(_)));
        assert_eq!(err.exit_code(), 3);
    }
}
