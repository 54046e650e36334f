//! mcp
//!
//! A Model Context Protocol server over stdio.
//!
//! # Design
//!
//! The server speaks JSON-RPC 2.0, one message per line. It advertises a
//! flat tool catalog mirroring the container runtime's command families
//! and executes every call through the shared [`Runner`] seam, so agents
//! drive the same code paths as the CLI.
//!
//! # Architecture
//!
//! - [`protocol`]: wire types and error codes.
//! - [`tools`]: tool definitions, input validation, and handlers.
//! - [`format`]: plain-text rendering of tool outcomes.
//! - [`server`]: the stdio loop and method dispatch.
//!
//! [`Runner`]: crate::runtime::Runner

pub mod format;
pub mod protocol;
pub mod server;
pub mod tools;

pub use server::Server;

use thiserror::Error;

/// Transport-level failures. Protocol failures are answered in-band and
/// never surface here.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("stdio transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("response serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
