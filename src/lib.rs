//! Stowage - a CLI companion and MCP server for the container runtime
//!
//! Stowage wraps the external `container` CLI/daemon: it exposes the same
//! container, image, system, registry, and builder operations as subcommands,
//! and serves them to LLM agents as MCP tools over stdio.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to ops)
//! - [`runtime`] - Single subprocess seam: argv construction and execution
//! - [`ops`] - Typed operations over the runtime (containers, images, system, logs)
//! - [`model`] - Serde mirrors of the runtime's JSON vocabulary
//! - [`mcp`] - JSON-RPC 2.0 tool server over stdio
//! - [`config`] - Global configuration
//! - [`secrets`] - Registry credential storage abstraction
//! - [`ui`] - User interaction utilities
//!
//! # Error Semantics
//!
//! Errors are passed through, not recovered from: a non-zero runtime exit or
//! an unparsable payload surfaces as a message to the caller. There are no
//! retries and no partial-failure reconciliation.

pub mod cli;
pub mod config;
pub mod mcp;
pub mod model;
pub mod ops;
pub mod runtime;
pub mod secrets;
pub mod ui;
