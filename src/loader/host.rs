//! The long-lived host runtime used for in-process loads

use super::protocol::{decode_line, encode_line, HostCommand, HostReply, HostReplyBody, HostRequest};
use super::LoaderOptions;
use crate::error::LoadError;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

const HOST_SCRIPT: &str = include_str!("js/host.js");

/// How long to wait for a child to exit on its own before killing it
const EXIT_GRACE: Duration = Duration::from_secs(1);

/// A running `node` process executing the host script
pub struct HostProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

impl HostProcess {
    /// Spawn the host runtime in the project directory
    pub fn spawn(options: &LoaderOptions) -> Result<Self, LoadError> {
        let mut child = Command::new(&options.node_binary)
            .arg("-e")
            .arg(HOST_SCRIPT)
            .current_dir(&options.project_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(options.child_stderr())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LoadError::Spawn(format!("{}: {}", options.node_binary, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LoadError::protocol("host stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LoadError::protocol("host stdout unavailable"))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
        })
    }

    /// Send one command and wait for the reply carrying the same id
    pub async fn request(&mut self, command: HostCommand) -> Result<HostReplyBody, LoadError> {
        let id = self.next_id;
        self.next_id += 1;

        let line = encode_line(&HostRequest { id, command })
            .map_err(|e| LoadError::protocol(e.to_string()))?;

        if let Err(e) = self.write_line(&line).await {
            return Err(LoadError::HostExited(format!("{} ({})", e, self.exit_status().await)));
        }

        loop {
            match self.stdout.next_line().await {
                Ok(Some(line)) => match decode_line::<HostReply>(&line) {
                    Some(reply) if reply.id == id => return Ok(reply.body),
                    // Stray output or a reply to an abandoned request
                    _ => continue,
                },
                Ok(None) => return Err(LoadError::HostExited(self.exit_status().await)),
                Err(e) => return Err(LoadError::HostExited(e.to_string())),
            }
        }
    }

    async fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await
    }

    async fn exit_status(&mut self) -> String {
        match tokio::time::timeout(EXIT_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => status.to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => "stopped responding".to_string(),
        }
    }

    /// Close stdin so the host exits, killing it if it lingers
    pub async fn shutdown(self) {
        let HostProcess { mut child, stdin, .. } = self;
        drop(stdin);
        reap(&mut child).await;
    }
}

/// Wait briefly for a child to exit, then kill and reap it
pub(crate) async fn reap(child: &mut Child) {
    if tokio::time::timeout(EXIT_GRACE, child.wait()).await.is_err() {
        let _ = child.kill().await;
    }
}
