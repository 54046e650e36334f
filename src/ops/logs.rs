//! ops::logs
//!
//! Log retrieval and streaming sessions.
//!
//! # Design
//!
//! Non-follow requests run to completion and return the captured text.
//! Follow requests return a [`LogSession`] wrapping the underlying
//! command stream: lines arrive tagged with their source, and closing or
//! dropping the session kills the follower process. There is no
//! backpressure or resumption beyond raw append.

use crate::runtime::{
    ArgBuilder, CommandOutput, CommandStream, ExecOptions, Runner, StreamChunk,
};

use super::{run, OpsError};

/// A container log request.
#[derive(Debug, Clone, Default)]
pub struct LogRequest {
    pub container: String,
    pub follow: bool,
    /// Only the last N lines.
    pub tail: Option<u64>,
    /// Boot logs instead of stdio.
    pub boot: bool,
}

impl LogRequest {
    fn argv(&self) -> Vec<String> {
        let mut builder = ArgBuilder::new(["logs"])
            .flag("follow", self.follow)
            .flag("boot", self.boot);
        // The runtime takes the tail count as short `-n`.
        if let Some(n) = self.tail {
            builder = builder.arg("-n").arg(n.to_string());
        }
        builder.arg(&self.container).build()
    }
}

/// A live log-following session.
///
/// Dropping the session kills the follower; no stray child outlives its
/// consumer.
#[derive(Debug)]
pub struct LogSession {
    stream: CommandStream,
}

impl LogSession {
    /// The next log line, or `None` when the command has finished.
    pub async fn next_line(&mut self) -> Option<StreamChunk> {
        self.stream.next_chunk().await
    }

    /// Stop following and kill the child.
    pub fn close(&mut self) {
        self.stream.close();
    }

    /// Wait for the follower to exit and collect its final output.
    pub async fn wait(self) -> Result<CommandOutput, OpsError> {
        Ok(self.stream.wait().await?)
    }
}

/// Fetch container logs to completion.
pub async fn fetch(runner: &dyn Runner, req: &LogRequest) -> Result<String, OpsError> {
    let opts = ExecOptions::with_timeout(runner.timeouts().default);
    let output = run(runner, req.argv(), &opts).await?;
    Ok(output.stdout)
}

/// Follow container logs as a live session.
pub async fn follow(runner: &dyn Runner, req: &LogRequest) -> Result<LogSession, OpsError> {
    let mut req = req.clone();
    req.follow = true;
    let stream = runner.stream(&req.argv(), &ExecOptions::unbounded()).await?;
    Ok(LogSession { stream })
}

/// Fetch system service logs to completion.
pub async fn fetch_system(
    runner: &dyn Runner,
    last: Option<&str>,
) -> Result<String, OpsError> {
    let args = ArgBuilder::new(["system", "logs"]).opt("last", last).build();
    let output = run(runner, args, &ExecOptions::with_timeout(runner.timeouts().default)).await?;
    Ok(output.stdout)
}

/// Follow system service logs as a live session.
pub async fn follow_system(
    runner: &dyn Runner,
    last: Option<&str>,
) -> Result<LogSession, OpsError> {
    let args = ArgBuilder::new(["system", "logs"])
        .opt("last", last)
        .flag("follow", true)
        .build();
    let stream = runner.stream(&args, &ExecOptions::unbounded()).await?;
    Ok(LogSession { stream })
}
