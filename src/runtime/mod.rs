//! runtime
//!
//! The single subprocess seam over the external container CLI.
//!
//! # Architecture
//!
//! Every interaction with the runtime flows through the [`Runner`] trait:
//! the [`ops`](crate::ops) layer and the MCP tool handlers build argument
//! arrays and hand them to a runner; nothing else in the crate spawns
//! processes. [`CliRunner`] is the production implementation;
//! [`mock::RecordingRunner`] records argument arrays and replays canned
//! outputs for tests.
//!
//! # Error Semantics
//!
//! A non-zero exit is NOT a `RuntimeError`: it comes back as a
//! [`CommandOutput`] with `success == false` so callers can pass the
//! runtime's stderr through verbatim. `RuntimeError` is reserved for
//! failures to run the command at all (missing binary, spawn failure,
//! timeout) and for unparsable payloads.

pub mod argv;
pub mod cli;
pub mod mock;
pub mod table;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub use argv::ArgBuilder;
pub use cli::CliRunner;
pub use mock::RecordingRunner;

/// Default timeout for one-shot commands (matches the upstream executor).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for image pulls and pushes.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(600);

/// Timeout for image builds, saves, and loads.
pub const BUILD_TIMEOUT: Duration = Duration::from_secs(300);

/// The three timeout classes commands run under.
///
/// Callers pick the class; the values come from the runner so that the
/// config file's `[timeouts]` overrides reach every command built against
/// that runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// One-shot commands (list, inspect, lifecycle).
    pub default: Duration,
    /// Registry transfers (pull, push).
    pub transfer: Duration,
    /// Builds and archive operations (build, save, load).
    pub build: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default: DEFAULT_TIMEOUT,
            transfer: TRANSFER_TIMEOUT,
            build: BUILD_TIMEOUT,
        }
    }
}

/// Errors from the runtime seam.
///
/// Command failures reported by the runtime itself (non-zero exit) are not
/// errors at this layer; see [`CommandOutput`].
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The runtime binary could not be found or started.
    #[error("cannot run {binary}: {reason}")]
    Spawn {
        /// Binary we attempted to run
        binary: String,
        /// OS-level failure description
        reason: String,
    },

    /// The command did not finish within the allotted time.
    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    /// The runtime's output could not be parsed as the expected shape.
    #[error("cannot parse runtime output: {0}")]
    Parse(String),

    /// I/O error talking to the child process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// True when the process exited with status zero.
    pub success: bool,
    /// Raw exit code (-1 when terminated by signal).
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Parse stdout as JSON into the expected type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RuntimeError> {
        serde_json::from_str(self.stdout.trim()).map_err(|e| RuntimeError::Parse(e.to_string()))
    }

    /// Best error message for a failed command: trimmed stderr when
    /// present, else a generic exit-status line.
    pub fn error_message(&self) -> String {
        let err = self.stderr.trim();
        if err.is_empty() {
            format!("runtime exited with status {}", self.exit_code)
        } else {
            err.to_string()
        }
    }
}

/// Options controlling one execution.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Wall-clock limit; `None` means wait forever (streaming).
    pub timeout: Option<Duration>,
    /// Data written to the child's stdin before closing it.
    pub stdin: Option<String>,
    /// Extra environment variables for the child.
    pub env: Vec<(String, String)>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            stdin: None,
            env: Vec::new(),
        }
    }
}

impl ExecOptions {
    /// Options with a specific timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }

    /// Options with no timeout (streaming commands).
    pub fn unbounded() -> Self {
        Self {
            timeout: None,
            ..Self::default()
        }
    }
}

/// Which stream a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamSource {
    Stdout,
    Stderr,
}

/// One line produced by a streaming command.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StreamChunk {
    pub line: String,
    pub source: StreamSource,
}

/// Handle to a running streaming command.
///
/// Lines arrive through [`next_chunk`](Self::next_chunk); [`close`]
/// (Self::close) kills the child. Dropping the handle also kills the child
/// (the runner spawns with kill-on-drop), so an abandoned log viewer never
/// leaks a follower process.
#[derive(Debug)]
pub struct CommandStream {
    chunks: mpsc::Receiver<StreamChunk>,
    waiter: JoinHandle<Result<CommandOutput, RuntimeError>>,
    kill: Option<oneshot::Sender<()>>,
}

impl CommandStream {
    /// Assemble a stream from its parts. Used by runner implementations.
    pub fn from_parts(
        chunks: mpsc::Receiver<StreamChunk>,
        waiter: JoinHandle<Result<CommandOutput, RuntimeError>>,
        kill: oneshot::Sender<()>,
    ) -> Self {
        Self {
            chunks,
            waiter,
            kill: Some(kill),
        }
    }

    /// Receive the next line, or `None` once the command has finished and
    /// the channel has drained.
    pub async fn next_chunk(&mut self) -> Option<StreamChunk> {
        self.chunks.recv().await
    }

    /// Ask the runner to kill the child. Idempotent.
    pub fn close(&mut self) {
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
    }

    /// Wait for the command to finish and return its captured output.
    pub async fn wait(self) -> Result<CommandOutput, RuntimeError> {
        match self.waiter.await {
            Ok(result) => result,
            Err(e) => Err(RuntimeError::Parse(format!("stream task failed: {}", e))),
        }
    }
}

/// The runtime execution seam.
///
/// Implementations must be thread-safe; the MCP server shares one runner
/// across tool calls.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Run a command to completion and capture its output.
    async fn execute(&self, args: &[String], opts: &ExecOptions)
        -> Result<CommandOutput, RuntimeError>;

    /// Start a streaming command (log following, build output).
    async fn stream(&self, args: &[String], opts: &ExecOptions)
        -> Result<CommandStream, RuntimeError>;

    /// The timeout classes callers should run commands under.
    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }
}

/// Probe that the runtime CLI is available (`--version` exits zero).
pub async fn probe(runner: &dyn Runner) -> bool {
    let args = vec!["--version".to_string()];
    let opts = ExecOptions::with_timeout(runner.timeouts().default);
    matches!(
        runner.execute(&args, &opts).await,
        Ok(output) if output.success
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    mod command_output {
        use super::*;

        #[test]
        fn json_parses_trimmed_stdout() {
            let output = CommandOutput {
                success: true,
                exit_code: 0,
                stdout: "  [1, 2, 3]\n".to_string(),
                stderr: String::new(),
            };
            let values: Vec<u32> = output.json().unwrap();
            assert_eq!(values, vec![1, 2, 3]);
        }

        #[test]
        fn json_failure_is_parse_error() {
            let output = CommandOutput {
                success: true,
                exit_code: 0,
                stdout: "not json".to_string(),
                stderr: String::new(),
            };
            let err = output.json::<Vec<u32>>().unwrap_err();
            assert!(matches!(err, RuntimeError::Parse(_)));
        }

        #[test]
        fn error_message_prefers_stderr() {
            let output = CommandOutput {
                success: false,
                exit_code: 1,
                stdout: String::new(),
                stderr: "no such container: web\n".to_string(),
            };
            assert_eq!(output.error_message(), "no such container: web");
        }

        #[test]
        fn error_message_falls_back_to_exit_code() {
            let output = CommandOutput {
                success: false,
                exit_code: 125,
                stdout: String::new(),
                stderr: "  \n".to_string(),
            };
            assert_eq!(output.error_message(), "runtime exited with status 125");
        }
    }

    mod exec_options {
        use super::*;

        #[test]
        fn default_has_thirty_second_timeout() {
            assert_eq!(ExecOptions::default().timeout, Some(DEFAULT_TIMEOUT));
        }

        #[test]
        fn unbounded_has_no_timeout() {
            assert!(ExecOptions::unbounded().timeout.is_none());
        }
    }

    #[test]
    fn timeouts_default_to_the_upstream_constants() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.default, DEFAULT_TIMEOUT);
        assert_eq!(timeouts.transfer, TRANSFER_TIMEOUT);
        assert_eq!(timeouts.build, BUILD_TIMEOUT);
    }

    #[test]
    fn stream_source_wire_format() {
        assert_eq!(
            serde_json::to_string(&StreamSource::Stderr).unwrap(),
            "\"stderr\""
        );
    }
}
