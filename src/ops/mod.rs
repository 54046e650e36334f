//! ops
//!
//! Typed operations over the runtime seam.
//!
//! # Architecture
//!
//! Each submodule wraps one family of runtime subcommands with typed
//! requests and typed results: [`containers`], [`images`], [`system`],
//! [`logs`]. Functions take a `&dyn Runner` so the same code path serves
//! the CLI commands, the MCP tool handlers, and the tests (which pass the
//! recording mock).
//!
//! # Error Semantics
//!
//! Pass-through: a non-zero exit becomes [`OpsError::Failed`] carrying the
//! runtime's own message verbatim. There is no retry or recovery here.

pub mod containers;
pub mod images;
pub mod logs;
pub mod system;

use serde::Serialize;
use thiserror::Error;

use crate::runtime::{CommandOutput, ExecOptions, Runner, RuntimeError};

/// Errors from the typed operations layer.
#[derive(Debug, Error)]
pub enum OpsError {
    /// The command could not be run (missing binary, timeout, bad JSON).
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// The runtime ran and reported a failure; message passed through.
    #[error("{0}")]
    Failed(String),

    /// A referenced container or image does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request itself is unusable (e.g. delete with no target).
    #[error("{0}")]
    Invalid(String),
}

/// Execute a command and convert a non-zero exit into [`OpsError::Failed`].
pub(crate) async fn run(
    runner: &dyn Runner,
    args: Vec<String>,
    opts: &ExecOptions,
) -> Result<CommandOutput, OpsError> {
    let output = runner.execute(&args, opts).await?;
    if !output.success {
        return Err(OpsError::Failed(output.error_message()));
    }
    Ok(output)
}

/// Response envelope used by the `--json` output mode.
///
/// `t` is a millisecond UNIX timestamp; `code == 0` means success with
/// `data` present; a non-zero `code` carries `msg`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub t: i64,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    /// Success envelope with payload.
    pub fn ok(data: T) -> Self {
        Self {
            t: chrono::Utc::now().timestamp_millis(),
            code: 0,
            msg: None,
            data: Some(data),
        }
    }

    /// Failure envelope carrying a message.
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            t: chrono::Utc::now().timestamp_millis(),
            code: 1,
            msg: Some(msg.into()),
            data: None,
        }
    }

    /// Fold an operation result into an envelope.
    pub fn from_result(result: Result<T, OpsError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}
