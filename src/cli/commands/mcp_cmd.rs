//! cli::commands::mcp_cmd
//!
//! Entry point for the MCP server.

use anyhow::Result;

use crate::mcp::Server;

use super::Context;

/// Serve MCP tools over stdio until stdin closes.
pub fn serve(ctx: &Context) -> Result<()> {
    ctx.debug("serving MCP over stdio");

    let server = Server::new(ctx.runner());
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(server.serve())?;
    Ok(())
}
