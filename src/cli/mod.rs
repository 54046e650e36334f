//! cli
//!
//! The command-line surface: clap argument definitions, global-flag
//! resolution, and dispatch to per-command handlers.
//!
//! This layer stays thin. Handlers call into [`crate::ops`], and all
//! runtime interaction flows through the [`crate::runtime::Runner`]
//! seam, so the same operations back both the CLI and the MCP server.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::Result;

use crate::config::Config;

/// Parse arguments, load configuration, and run the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config = Config::load()?;
    let ctx = commands::Context::new(&cli, config);

    commands::dispatch(cli.command, &ctx)
}
