//! runtime::cli
//!
//! Production [`Runner`] that shells out to the container runtime binary.
//!
//! # Design
//!
//! One runner instance wraps one binary path (default `container`).
//! Buffered execution enforces the caller's timeout with `tokio::time`;
//! streaming execution spawns with kill-on-drop and reads stdout/stderr
//! line-by-line into an mpsc channel, so a dropped [`CommandStream`] never
//! leaves a follower process behind.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

use super::{
    CommandOutput, CommandStream, ExecOptions, Runner, RuntimeError, StreamChunk, StreamSource,
    Timeouts,
};

/// Default name of the runtime binary, resolved through `PATH`.
pub const DEFAULT_BINARY: &str = "container";

/// Channel depth for streamed lines. The consumer is a terminal or an MCP
/// buffer; a burst beyond this just applies natural backpressure to the
/// reader task, not to the child.
const STREAM_CHANNEL_DEPTH: usize = 256;

/// Subprocess-backed runner.
#[derive(Debug, Clone)]
pub struct CliRunner {
    binary: String,
    timeouts: Timeouts,
}

impl CliRunner {
    /// Runner for the default `container` binary.
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_BINARY)
    }

    /// Runner for a specific binary path.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeouts: Timeouts::default(),
        }
    }

    /// Replace the timeout classes (config overrides).
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// The binary this runner invokes.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn command(&self, args: &[String], opts: &ExecOptions) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .stdin(if opts.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &opts.env {
            cmd.env(key, value);
        }
        cmd
    }

    fn spawn_error(&self, e: &std::io::Error) -> RuntimeError {
        RuntimeError::Spawn {
            binary: self.binary.clone(),
            reason: e.to_string(),
        }
    }
}

impl Default for CliRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Runner for CliRunner {
    async fn execute(
        &self,
        args: &[String],
        opts: &ExecOptions,
    ) -> Result<CommandOutput, RuntimeError> {
        let mut child = self
            .command(args, opts)
            .spawn()
            .map_err(|e| self.spawn_error(&e))?;

        if let Some(input) = &opts.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(input.as_bytes()).await?;
                // Dropping stdin closes the pipe so the child sees EOF.
            }
        }

        let collected = async {
            let output = child.wait_with_output().await?;
            Ok::<_, std::io::Error>(CommandOutput {
                success: output.status.success(),
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        };

        match opts.timeout {
            Some(limit) => match tokio::time::timeout(limit, collected).await {
                Ok(result) => Ok(result?),
                Err(_) => Err(RuntimeError::Timeout(limit)),
            },
            None => Ok(collected.await?),
        }
    }

    async fn stream(
        &self,
        args: &[String],
        opts: &ExecOptions,
    ) -> Result<CommandStream, RuntimeError> {
        let mut child = self
            .command(args, opts)
            .spawn()
            .map_err(|e| self.spawn_error(&e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_DEPTH);
        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        let out_task = tokio::spawn(read_lines(stdout, tx.clone(), StreamSource::Stdout));
        let err_task = tokio::spawn(read_lines(stderr, tx, StreamSource::Stderr));

        let timeout = opts.timeout;
        let waiter = tokio::spawn(async move {
            let mut kill_rx = kill_rx;
            // The close and timeout arms only record why the race ended;
            // the kill and reap run after the select, once the wait future
            // no longer borrows the child.
            let mut timed_out = false;
            let exited = tokio::select! {
                status = child.wait() => Some(status?),
                _ = &mut kill_rx => None,
                _ = sleep_or_forever(timeout) => {
                    timed_out = true;
                    None
                }
            };
            let status = match exited {
                Some(status) => status,
                None => {
                    let _ = child.start_kill();
                    child.wait().await?
                }
            };
            if timed_out {
                return Err(RuntimeError::Timeout(timeout.unwrap_or(Duration::ZERO)));
            }

            let stdout = out_task.await.unwrap_or_default();
            let stderr = err_task.await.unwrap_or_default();
            Ok(CommandOutput {
                success: status.success(),
                exit_code: status.code().unwrap_or(-1),
                stdout,
                stderr,
            })
        });

        Ok(CommandStream::from_parts(rx, waiter, kill_tx))
    }

    fn timeouts(&self) -> Timeouts {
        self.timeouts
    }
}

/// Sleep for the given duration, or pend forever when unbounded.
async fn sleep_or_forever(timeout: Option<Duration>) {
    match timeout {
        Some(limit) => tokio::time::sleep(limit).await,
        None => std::future::pending().await,
    }
}

/// Read lines from a child pipe into the chunk channel, returning the
/// accumulated text for the final [`CommandOutput`].
async fn read_lines<R>(pipe: Option<R>, tx: mpsc::Sender<StreamChunk>, source: StreamSource) -> String
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    let Some(pipe) = pipe else {
        return String::new();
    };

    let mut collected = String::new();
    let mut lines = BufReader::new(pipe).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        collected.push_str(&line);
        collected.push('\n');
        if tx
            .send(StreamChunk {
                line,
                source,
            })
            .await
            .is_err()
        {
            // Consumer is gone; keep draining so the child does not block
            // on a full pipe before the supervisor kills it.
        }
    }
    collected
}
