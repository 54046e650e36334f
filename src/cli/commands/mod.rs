//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each handler validates its arguments, calls the matching [`crate::ops`]
//! function, and renders the result. Handlers never build runtime argument
//! arrays themselves except for the registry and builder families, which
//! have no typed ops layer (their payloads are opaque text).
//!
//! # Async Commands
//!
//! Every operation awaits the runtime subprocess, so handlers create a
//! tokio runtime and `block_on` their async body.

mod builder;
mod completion;
mod container;
mod image;
mod mcp_cmd;
mod registry;
mod system;

pub use completion::completion;

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::cli::args::{Cli, Command};
use crate::config::Config;
use crate::ops::{Envelope, OpsError};
use crate::runtime::{CliRunner, Runner, Timeouts};
use crate::ui::output::{self, Verbosity};

/// Shared state resolved from global flags and config.
pub struct Context {
    pub config: Config,
    pub verbosity: Verbosity,
    pub json: bool,
    pub interactive: bool,
    runtime_binary: String,
}

impl Context {
    pub fn new(cli: &Cli, config: Config) -> Self {
        let debug = cli.debug || config.debug();
        let runtime_binary = cli
            .runtime_path
            .clone()
            .unwrap_or_else(|| config.runtime_path().to_string());

        Self {
            verbosity: Verbosity::from_flags(cli.quiet, debug),
            json: cli.json,
            interactive: cli.interactive(),
            runtime_binary,
            config,
        }
    }

    /// Build the runner for this invocation, carrying any `[timeouts]`
    /// overrides from the config file.
    pub fn runner(&self) -> Arc<dyn Runner> {
        let timeouts = Timeouts {
            default: self.config.default_timeout(),
            transfer: self.config.transfer_timeout(),
            build: self.config.build_timeout(),
        };
        Arc::new(CliRunner::with_binary(self.runtime_binary.clone()).with_timeouts(timeouts))
    }

    /// Print a normal-verbosity line.
    pub fn print(&self, message: impl std::fmt::Display) {
        output::print(message, self.verbosity);
    }

    /// Print a debug line.
    pub fn debug(&self, message: impl std::fmt::Display) {
        output::debug(message, self.verbosity);
    }

    /// Fold an operation result into output.
    ///
    /// In `--json` mode the result is printed as a response envelope and
    /// the process exits zero either way; consumers read `code`. In human
    /// mode a failure propagates as an error.
    pub fn finish<T: Serialize>(
        &self,
        result: Result<T, OpsError>,
        render: impl FnOnce(&Self, &T),
    ) -> Result<()> {
        if self.json {
            let envelope = Envelope::from_result(result);
            println!("{}", serde_json::to_string(&envelope)?);
            return Ok(());
        }
        let value = result?;
        render(self, &value);
        Ok(())
    }
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Container(cmd) => container::dispatch(cmd, ctx),
        Command::Image(cmd) => image::dispatch(cmd, ctx),
        Command::System(cmd) => system::dispatch(cmd, ctx),
        Command::Registry(cmd) => registry::dispatch(cmd, ctx),
        Command::Builder(cmd) => builder::dispatch(cmd, ctx),
        Command::Mcp => mcp_cmd::serve(ctx),
        Command::Completion { shell } => completion(shell),
    }
}
