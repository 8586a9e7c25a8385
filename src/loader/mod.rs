//! Module loading against a Node.js runtime
//!
//! Two execution strategies are available:
//! - in-process: a timed `require` inside one long-lived host runtime, which
//!   purges the module from `require.cache` afterwards so the next run
//!   re-executes it
//! - isolated: a timed dynamic `import()` inside a one-shot worker process
//!
//! [`ModuleLoader`] is the seam the harness drives; [`NodeLoader`] is the
//! real implementation.

pub mod host;
pub mod isolated;
pub mod protocol;
pub mod selector;

pub use host::HostProcess;
pub use selector::{Decision, DecisionReason, IsolationSelector};

use crate::error::{AppError, LoadError, Result};
use crate::models::Config;
use crate::types::{LoadStrategy, ModuleKind};
use async_trait::async_trait;
use protocol::{HostCommand, HostReplyBody};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

/// Loads single modules and reports elapsed nanoseconds
#[async_trait]
pub trait ModuleLoader: Send {
    /// Resolve an identifier to a loadable path, `None` if it can't be resolved
    async fn resolve(&mut self, module: &str) -> Option<String>;

    /// Throwaway load that reports the declared module kind. Must leave no
    /// cached state behind.
    async fn probe(&mut self, path: &str) -> std::result::Result<ModuleKind, LoadError>;

    async fn load_in_process(&mut self, path: &str) -> std::result::Result<u64, LoadError>;

    async fn load_isolated(&mut self, path: &str) -> std::result::Result<u64, LoadError>;

    /// Time one load with the given strategy
    async fn time(&mut self, path: &str, strategy: LoadStrategy) -> std::result::Result<u64, LoadError> {
        match strategy {
            LoadStrategy::InProcess => self.load_in_process(path).await,
            LoadStrategy::Isolated => self.load_isolated(path).await,
        }
    }
}

/// Settings shared by the host runtime and the workers
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub node_binary: String,
    pub project_dir: PathBuf,
    /// Per-request limit; `None` waits forever
    pub timeout: Option<Duration>,
    /// Let child stderr (including output of measured packages) through
    pub show_child_output: bool,
    /// Limit for the startup ping, applied even when `timeout` is `None`
    pub handshake_timeout: Duration,
}

impl LoaderOptions {
    pub fn new(node_binary: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            node_binary: node_binary.into(),
            project_dir: project_dir.into(),
            timeout: None,
            show_child_output: false,
            handshake_timeout: Duration::from_secs(crate::defaults::HANDSHAKE_TIMEOUT_SECONDS),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            node_binary: config.node_binary.clone(),
            project_dir: config.project_dir.clone(),
            timeout: config.timeout(),
            show_child_output: config.debug,
            handshake_timeout: Duration::from_secs(crate::defaults::HANDSHAKE_TIMEOUT_SECONDS),
        }
    }

    fn child_stderr(&self) -> Stdio {
        if self.show_child_output {
            Stdio::inherit()
        } else {
            Stdio::null()
        }
    }
}

/// [`ModuleLoader`] backed by real `node` processes
pub struct NodeLoader {
    options: LoaderOptions,
    host: Option<HostProcess>,
    node_version: String,
    host_restarts: u32,
}

impl NodeLoader {
    /// Start the host runtime and check that it answers
    pub async fn start(options: LoaderOptions) -> Result<Self> {
        let mut host = HostProcess::spawn(&options)
            .map_err(|e| AppError::runtime(e.to_string()))?;

        let handshake = host.request(HostCommand::Ping);
        let reply = tokio::time::timeout(options.handshake_timeout, handshake)
            .await
            .map_err(|_| AppError::runtime(format!("{} did not answer the handshake", options.node_binary)))?
            .map_err(|e| AppError::runtime(e.to_string()))?;

        let node_version = match reply {
            HostReplyBody::Ready { version } => version,
            other => {
                return Err(AppError::runtime(format!("unexpected handshake reply: {:?}", other)));
            }
        };

        Ok(Self {
            options,
            host: Some(host),
            node_version,
            host_restarts: 0,
        })
    }

    /// Version string reported by the runtime, e.g. `v20.11.0`
    pub fn node_version(&self) -> &str {
        &self.node_version
    }

    /// How many times the host runtime had to be replaced
    pub fn host_restarts(&self) -> u32 {
        self.host_restarts
    }

    /// Stop the host runtime
    pub async fn shutdown(mut self) {
        if let Some(host) = self.host.take() {
            host.shutdown().await;
        }
    }

    async fn call(&mut self, command: HostCommand) -> std::result::Result<HostReplyBody, LoadError> {
        let timeout = self.options.timeout;

        if self.host.is_none() {
            self.host = Some(HostProcess::spawn(&self.options)?);
            self.host_restarts += 1;
        }
        let host = match self.host.as_mut() {
            Some(host) => host,
            None => return Err(LoadError::HostExited("host runtime unavailable".to_string())),
        };

        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, host.request(command))
                .await
                .unwrap_or(Err(LoadError::Timeout(limit))),
            None => host.request(command).await,
        };

        // A host that died, hung or spoke garbage is replaced on next use.
        if matches!(
            result,
            Err(LoadError::HostExited(_)) | Err(LoadError::Timeout(_)) | Err(LoadError::Protocol(_))
        ) {
            if let Some(host) = self.host.take() {
                host.shutdown().await;
            }
        }

        result
    }
}

#[async_trait]
impl ModuleLoader for NodeLoader {
    async fn resolve(&mut self, module: &str) -> Option<String> {
        match self.call(HostCommand::Resolve { module: module.to_string() }).await {
            Ok(HostReplyBody::Resolved { path }) => path,
            _ => None,
        }
    }

    async fn probe(&mut self, path: &str) -> std::result::Result<ModuleKind, LoadError> {
        match self.call(HostCommand::Probe { path: path.to_string() }).await? {
            HostReplyBody::Probed { kind } => Ok(kind),
            HostReplyBody::Failed { error } => Err(LoadError::Module(error)),
            other => Err(LoadError::protocol(format!("unexpected probe reply: {:?}", other))),
        }
    }

    async fn load_in_process(&mut self, path: &str) -> std::result::Result<u64, LoadError> {
        match self.call(HostCommand::Load { path: path.to_string() }).await? {
            HostReplyBody::Loaded { timespan } => Ok(timespan),
            HostReplyBody::Failed { error } => Err(LoadError::Module(error)),
            other => Err(LoadError::protocol(format!("unexpected load reply: {:?}", other))),
        }
    }

    async fn load_isolated(&mut self, path: &str) -> std::result::Result<u64, LoadError> {
        isolated::load_in_worker(&self.options, path).await
    }
}
