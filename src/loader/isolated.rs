//! One-shot worker processes for isolated-context loads

use super::host::reap;
use super::protocol::{decode_line, encode_line, WorkerReply, WorkerRequest};
use super::LoaderOptions;
use crate::error::LoadError;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

const WORKER_SCRIPT: &str = include_str!("js/worker.js");

/// Spawn a worker, send it `path`, and wait for its single reply.
///
/// The child is always reaped before returning. A worker that exits without
/// replying yields [`LoadError::ClosedBeforeResult`].
pub async fn load_in_worker(options: &LoaderOptions, path: &str) -> Result<u64, LoadError> {
    let mut child = Command::new(&options.node_binary)
        .arg("-e")
        .arg(WORKER_SCRIPT)
        .current_dir(&options.project_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(options.child_stderr())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| LoadError::Spawn(format!("{}: {}", options.node_binary, e)))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| LoadError::protocol("worker stdin unavailable"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| LoadError::protocol("worker stdout unavailable"))?;

    let request = encode_line(&WorkerRequest { module_path: path.to_string() })
        .map_err(|e| LoadError::protocol(e.to_string()))?;

    let exchange = async move {
        // A worker that died early shows up as EOF on stdout below.
        let _ = stdin.write_all(request.as_bytes()).await;
        let _ = stdin.flush().await;
        drop(stdin);
        read_reply(BufReader::new(stdout)).await
    };

    let outcome = match options.timeout {
        Some(limit) => tokio::time::timeout(limit, exchange)
            .await
            .unwrap_or(Err(LoadError::Timeout(limit))),
        None => exchange.await,
    };

    if outcome.is_err() {
        let _ = child.start_kill();
    }
    reap(&mut child).await;

    outcome
}

/// Read lines until the first worker reply or EOF
pub(crate) async fn read_reply<R: AsyncBufRead + Unpin>(reader: R) -> Result<u64, LoadError> {
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match decode_line::<WorkerReply>(&line) {
                Some(WorkerReply::Timespan { timespan }) => return Ok(timespan),
                Some(WorkerReply::Error { error }) => return Err(LoadError::Module(error)),
                None => continue,
            },
            Ok(None) => return Err(LoadError::ClosedBeforeResult),
            Err(e) => return Err(LoadError::protocol(e.to_string())),
        }
    }
}
