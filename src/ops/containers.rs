//! ops::containers
//!
//! Container lifecycle operations.
//!
//! # Invariants
//!
//! - Mutating operations (`start`, `stop`, `kill`) re-fetch the container
//!   afterwards and return the updated record, so callers always see the
//!   post-operation state.
//! - `stop` defaults to SIGTERM with a 5000 ms grace period; the runtime
//!   CLI takes the grace period in whole seconds.
//! - `delete` stops a running container first (SIGKILL, 5 s) and returns
//!   the last record observed before deletion.

use crate::model::{ContainerRecord, Signal};
use crate::runtime::{ArgBuilder, ExecOptions, Runner};

use super::{run, OpsError};

/// Grace period applied when stopping, in milliseconds.
pub const DEFAULT_STOP_TIMEOUT_MS: u64 = 5000;

/// Options for [`stop`].
#[derive(Debug, Clone)]
pub struct StopOptions {
    pub signal: Signal,
    pub timeout_ms: u64,
}

impl Default for StopOptions {
    fn default() -> Self {
        Self {
            signal: Signal::TERM,
            timeout_ms: DEFAULT_STOP_TIMEOUT_MS,
        }
    }
}

/// List all containers, including stopped ones.
pub async fn list(runner: &dyn Runner) -> Result<Vec<ContainerRecord>, OpsError> {
    let args = ArgBuilder::new(["list"])
        .flag("all", true)
        .opt("format", Some("json"))
        .build();
    let output = run(runner, args, &ExecOptions::with_timeout(runner.timeouts().default)).await?;
    Ok(output.json()?)
}

/// Fetch one container by ID or name.
pub async fn get(runner: &dyn Runner, id: &str) -> Result<ContainerRecord, OpsError> {
    let args = ArgBuilder::new(["inspect"]).arg(id).build();
    let output = run(runner, args, &ExecOptions::with_timeout(runner.timeouts().default)).await?;
    let mut records: Vec<ContainerRecord> = output.json()?;
    if records.is_empty() {
        return Err(OpsError::NotFound(format!("container {}", id)));
    }
    Ok(records.remove(0))
}

/// Start a container and return its updated record.
pub async fn start(runner: &dyn Runner, id: &str) -> Result<ContainerRecord, OpsError> {
    let args = ArgBuilder::new(["start"]).arg(id).build();
    run(runner, args, &ExecOptions::with_timeout(runner.timeouts().default)).await?;
    get(runner, id).await
}

/// Stop a container gracefully and return its updated record.
pub async fn stop(
    runner: &dyn Runner,
    id: &str,
    opts: &StopOptions,
) -> Result<ContainerRecord, OpsError> {
    let args = ArgBuilder::new(["stop"])
        .opt("signal", Some(opts.signal.name()))
        .opt("time", Some(opts.timeout_ms / 1000))
        .arg(id)
        .build();
    run(runner, args, &ExecOptions::with_timeout(runner.timeouts().default)).await?;
    get(runner, id).await
}

/// Send a signal to a running container and return its updated record.
/// Defaults to SIGKILL when callers pass [`Signal::KILL`].
pub async fn kill(
    runner: &dyn Runner,
    id: &str,
    signal: Signal,
) -> Result<ContainerRecord, OpsError> {
    let args = ArgBuilder::new(["kill"])
        .opt("signal", Some(signal.name()))
        .arg(id)
        .build();
    run(runner, args, &ExecOptions::with_timeout(runner.timeouts().default)).await?;
    get(runner, id).await
}

/// Delete a container, stopping it first when it is still running.
///
/// Returns the record as it looked before deletion; the container no
/// longer exists once this returns.
pub async fn delete(runner: &dyn Runner, id: &str) -> Result<ContainerRecord, OpsError> {
    let record = get(runner, id).await?;
    if record.status.is_running() {
        let opts = StopOptions {
            signal: Signal::KILL,
            timeout_ms: DEFAULT_STOP_TIMEOUT_MS,
        };
        stop(runner, id, &opts).await?;
    }

    let args = ArgBuilder::new(["delete"]).arg(id).build();
    run(runner, args, &ExecOptions::with_timeout(runner.timeouts().default)).await?;
    Ok(record)
}
