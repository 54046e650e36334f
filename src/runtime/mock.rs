//! runtime::mock
//!
//! Recording [`Runner`] for deterministic testing.
//!
//! # Design
//!
//! The mock records every argument array it is handed and replays canned
//! outputs. Responses are keyed by argv prefix so tests survive the
//! concurrent fan-out paths (image inspection issues several calls whose
//! order is not fixed); each key holds a queue, letting a test return
//! different payloads to repeated identical calls (fetch, mutate, re-fetch).
//!
//! # Example
//!
//! ```
//! use stowage::runtime::{ExecOptions, RecordingRunner, Runner};
//!
//! # tokio_test::block_on(async {
//! let runner = RecordingRunner::new();
//! runner.respond_ok(&["list", "--format", "json"], "[]");
//!
//! let args: Vec<String> = ["list", "--format", "json"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let output = runner.execute(&args, &ExecOptions::default()).await.unwrap();
//!
//! assert!(output.success);
//! assert_eq!(output.stdout, "[]");
//! assert_eq!(runner.calls().len(), 1);
//! # });
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::{
    CommandOutput, CommandStream, ExecOptions, Runner, RuntimeError, StreamChunk, StreamSource,
    Timeouts,
};

/// Canned reply for one execution.
///
/// `RuntimeError` is not `Clone`, so error cases carry the data needed to
/// rebuild the error at replay time.
#[derive(Debug, Clone)]
pub enum CannedResult {
    /// Exit zero with the given stdout.
    Ok(String),
    /// Non-zero exit with the given code and stderr.
    Fail { exit_code: i32, stderr: String },
    /// The binary could not be spawned (missing runtime).
    SpawnError { binary: String, reason: String },
    /// The command timed out.
    Timeout(Duration),
}

impl CannedResult {
    fn replay(&self) -> Result<CommandOutput, RuntimeError> {
        match self {
            CannedResult::Ok(stdout) => Ok(CommandOutput {
                success: true,
                exit_code: 0,
                stdout: stdout.clone(),
                stderr: String::new(),
            }),
            CannedResult::Fail { exit_code, stderr } => Ok(CommandOutput {
                success: false,
                exit_code: *exit_code,
                stdout: String::new(),
                stderr: stderr.clone(),
            }),
            CannedResult::SpawnError { binary, reason } => Err(RuntimeError::Spawn {
                binary: binary.clone(),
                reason: reason.clone(),
            }),
            CannedResult::Timeout(limit) => Err(RuntimeError::Timeout(*limit)),
        }
    }
}

/// Canned reply for one streaming execution.
#[derive(Debug, Clone)]
pub struct CannedStream {
    /// Lines delivered through the stream, in order.
    pub chunks: Vec<StreamChunk>,
    /// Final output returned from `wait`.
    pub output: CommandOutput,
    /// When true the stream stays open after the lines until the caller
    /// closes it, imitating a log follower.
    pub stay_open: bool,
}

#[derive(Debug, Default)]
struct Inner {
    /// Every argv handed to the runner, in call order.
    calls: Vec<Vec<String>>,
    /// The timeout each call ran under, parallel to `calls`.
    call_timeouts: Vec<Option<Duration>>,
    /// Prefix-keyed response queues; first matching prefix with a
    /// remaining response wins.
    responses: Vec<(Vec<String>, VecDeque<CannedResult>)>,
    /// Streaming responses, consumed FIFO.
    streams: VecDeque<CannedStream>,
    /// Timeout classes reported through the `Runner` trait.
    timeouts: Timeouts,
}

/// Recording runner for tests.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingRunner {
    /// Create an empty mock with no canned responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a canned result for calls starting with `prefix`.
    ///
    /// Repeated calls for the same prefix consume queued results in
    /// order; an exhausted or unmatched call fails the test loudly via a
    /// `Fail` output naming the argv.
    pub fn respond(&self, prefix: &[&str], result: CannedResult) {
        let key: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
        let mut inner = self.inner.lock().unwrap();
        if let Some((_, queue)) = inner.responses.iter_mut().find(|(k, _)| *k == key) {
            queue.push_back(result);
        } else {
            inner.responses.push((key, VecDeque::from([result])));
        }
    }

    /// Queue a successful response with the given stdout.
    pub fn respond_ok(&self, prefix: &[&str], stdout: &str) {
        self.respond(prefix, CannedResult::Ok(stdout.to_string()));
    }

    /// Queue a successful response whose stdout is the given JSON value.
    pub fn respond_json(&self, prefix: &[&str], value: serde_json::Value) {
        self.respond(prefix, CannedResult::Ok(value.to_string()));
    }

    /// Queue a non-zero exit with the given stderr.
    pub fn respond_fail(&self, prefix: &[&str], exit_code: i32, stderr: &str) {
        self.respond(
            prefix,
            CannedResult::Fail {
                exit_code,
                stderr: stderr.to_string(),
            },
        );
    }

    /// Queue a spawn failure (runtime binary missing).
    pub fn respond_spawn_error(&self, prefix: &[&str]) {
        self.respond(
            prefix,
            CannedResult::SpawnError {
                binary: "container".to_string(),
                reason: "No such file or directory (os error 2)".to_string(),
            },
        );
    }

    /// Queue a canned stream.
    pub fn respond_stream(&self, stream: CannedStream) {
        self.inner.lock().unwrap().streams.push_back(stream);
    }

    /// Queue a stream of stdout lines that ends on its own with exit zero.
    pub fn respond_stream_lines(&self, lines: &[&str]) {
        self.respond_stream(CannedStream {
            chunks: lines
                .iter()
                .map(|l| StreamChunk {
                    line: l.to_string(),
                    source: StreamSource::Stdout,
                })
                .collect(),
            output: CommandOutput {
                success: true,
                exit_code: 0,
                stdout: lines.iter().map(|l| format!("{}\n", l)).collect(),
                stderr: String::new(),
            },
            stay_open: false,
        });
    }

    /// Override the timeout classes the mock reports to callers.
    pub fn set_timeouts(&self, timeouts: Timeouts) {
        self.inner.lock().unwrap().timeouts = timeouts;
    }

    /// All recorded argument arrays, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// The timeout each recorded call ran under, in call order.
    pub fn call_timeouts(&self) -> Vec<Option<Duration>> {
        self.inner.lock().unwrap().call_timeouts.clone()
    }

    /// Number of executions recorded so far.
    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls.len()
    }

    /// True when some recorded call starts with `prefix`.
    pub fn was_called_with(&self, prefix: &[&str]) -> bool {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .any(|call| starts_with(call, prefix))
    }

    fn take_response(
        &self,
        args: &[String],
        opts: &ExecOptions,
    ) -> Result<CommandOutput, RuntimeError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(args.to_vec());
        inner.call_timeouts.push(opts.timeout);

        let found = inner
            .responses
            .iter_mut()
            .find(|(key, queue)| !queue.is_empty() && args_start_with(args, key));
        match found {
            Some((_, queue)) => {
                let canned = queue.pop_front().unwrap();
                canned.replay()
            }
            None => Ok(CommandOutput {
                success: false,
                exit_code: 127,
                stdout: String::new(),
                stderr: format!("no canned response for argv {:?}", args),
            }),
        }
    }
}

fn starts_with(call: &[String], prefix: &[&str]) -> bool {
    call.len() >= prefix.len() && call.iter().zip(prefix).all(|(a, b)| a == b)
}

fn args_start_with(call: &[String], prefix: &[String]) -> bool {
    call.len() >= prefix.len() && call.iter().zip(prefix).all(|(a, b)| a == b)
}

#[async_trait]
impl Runner for RecordingRunner {
    async fn execute(
        &self,
        args: &[String],
        opts: &ExecOptions,
    ) -> Result<CommandOutput, RuntimeError> {
        self.take_response(args, opts)
    }

    async fn stream(
        &self,
        args: &[String],
        opts: &ExecOptions,
    ) -> Result<CommandStream, RuntimeError> {
        let canned = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(args.to_vec());
            inner.call_timeouts.push(opts.timeout);
            inner.streams.pop_front()
        };
        let Some(canned) = canned else {
            return Err(RuntimeError::Parse(format!(
                "no canned stream for argv {:?}",
                args
            )));
        };

        let (tx, rx) = mpsc::channel(64);
        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        let waiter = tokio::spawn(async move {
            for chunk in canned.chunks {
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
            drop(tx);
            if canned.stay_open {
                // Imitate a follower: only the kill signal ends it.
                let _ = kill_rx.await;
                let mut output = canned.output;
                output.success = false;
                output.exit_code = -1;
                return Ok(output);
            }
            Ok(canned.output)
        });

        Ok(CommandStream::from_parts(rx, waiter, kill_tx))
    }

    fn timeouts(&self) -> Timeouts {
        self.inner.lock().unwrap().timeouts
    }
}
