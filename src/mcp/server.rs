//! mcp::server
//!
//! The stdio JSON-RPC server loop and method dispatch.
//!
//! # Architecture
//!
//! One request per line on stdin, one response per line on stdout.
//! Dispatch is two-level: the JSON-RPC `method` selects the protocol
//! operation (`initialize`, `tools/list`, `tools/call`), and for
//! `tools/call` the tool name's prefix selects the handler group.
//!
//! # Invariants
//!
//! - Notifications (requests without an `id`) never produce a response.
//! - A tool that runs and fails still yields a *successful* JSON-RPC
//!   response carrying the failure text; only protocol-level problems
//!   (unknown method, bad params, unrunnable command) become errors.
//! - Nothing but responses is written to stdout; diagnostics go to stderr.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::runtime::Runner;

use super::format;
use super::protocol::{self, Request, Response, RpcError};
use super::tools::{self, ToolOutcome};
use super::McpError;

pub const SERVER_NAME: &str = "stowage";

/// The MCP server. Holds the runner every tool call executes through.
pub struct Server {
    runner: Arc<dyn Runner>,
}

impl Server {
    pub fn new(runner: Arc<dyn Runner>) -> Self {
        Self { runner }
    }

    /// Serve requests from stdin until it closes.
    pub async fn serve(&self) -> Result<(), McpError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut out = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let response = match serde_json::from_str::<Request>(&line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => Some(Response::failure(
                    Value::Null,
                    RpcError {
                        code: protocol::PARSE_ERROR,
                        message: format!("Parse error: {}", e),
                    },
                )),
            };
            if let Some(response) = response {
                let mut payload = serde_json::to_vec(&response)?;
                payload.push(b'\n');
                out.write_all(&payload).await?;
                out.flush().await?;
            }
        }
        Ok(())
    }

    /// Dispatch one request. Returns `None` for notifications.
    pub async fn handle_request(&self, request: Request) -> Option<Response> {
        if request.method.starts_with("notifications/") {
            return None;
        }
        let id = request.id.clone()?;

        let result = match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(&request.params).await,
            other => Err(RpcError::method_not_found(format!(
                "Method not found: {}",
                other
            ))),
        };

        Some(match result {
            Ok(value) => Response::success(id, value),
            Err(error) => Response::failure(id, error),
        })
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": protocol::PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = tools::catalog().iter().map(|t| t.to_json()).collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: &Value) -> Result<Value, RpcError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("tools/call requires a tool name"))?;
        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        let outcome = self.dispatch(name, &arguments).await?;
        Ok(protocol::text_result(format::tool_result(name, &outcome)))
    }

    async fn dispatch(&self, name: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
        let runner: &dyn Runner = self.runner.as_ref();
        if name.starts_with("container_") {
            tools::container::handle(runner, name, args).await
        } else if name.starts_with("image_") {
            tools::image::handle(runner, name, args).await
        } else if name.starts_with("system_")
            || name.starts_with("registry_")
            || name.starts_with("builder_")
        {
            tools::system::handle(runner, name, args).await
        } else {
            Err(RpcError::method_not_found(format!("Unknown tool: {}", name)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RecordingRunner;

    fn server(runner: RecordingRunner) -> Server {
        Server::new(Arc::new(runner))
    }

    fn request(id: i64, method: &str, params: Value) -> Request {
        serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn initialize_reports_protocol_and_identity() {
        let srv = server(RecordingRunner::new());
        let resp = srv
            .handle_request(request(1, "initialize", json!({})))
            .await
            .unwrap();

        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], protocol::PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn tools_list_advertises_full_catalog() {
        let srv = server(RecordingRunner::new());
        let resp = srv
            .handle_request(request(2, "tools/list", json!({})))
            .await
            .unwrap();

        let listed = resp.result.unwrap()["tools"].as_array().unwrap().len();
        assert_eq!(listed, tools::catalog().len());
    }

    #[tokio::test]
    async fn tools_call_routes_by_prefix_and_formats_text() {
        let runner = RecordingRunner::new();
        runner.respond_ok(&["list", "--all"], "id  image\nweb  nginx:latest\n");
        let srv = server(runner);

        let resp = srv
            .handle_request(request(
                3,
                "tools/call",
                json!({"name": "container_list", "arguments": {"all": true}}),
            ))
            .await
            .unwrap();

        let result = resp.result.unwrap();
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("=== CONTAINER LIST ==="));
        assert!(text.contains("**Status**: SUCCESS"));
    }

    #[tokio::test]
    async fn failed_command_is_a_successful_response() {
        let runner = RecordingRunner::new();
        runner.respond_fail(&["start", "ghost"], 1, "no such container");
        let srv = server(runner);

        let resp = srv
            .handle_request(request(
                4,
                "tools/call",
                json!({"name": "container_start", "arguments": {"containerId": "ghost"}}),
            ))
            .await
            .unwrap();

        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("**Status**: FAILED"));
        assert!(text.contains("no such container"));
    }

    #[tokio::test]
    async fn unknown_tool_is_method_not_found() {
        let srv = server(RecordingRunner::new());
        let resp = srv
            .handle_request(request(
                5,
                "tools/call",
                json!({"name": "volume_list", "arguments": {}}),
            ))
            .await
            .unwrap();

        let error = resp.error.unwrap();
        assert_eq!(error.code, protocol::METHOD_NOT_FOUND);
        assert!(error.message.contains("volume_list"));
    }

    #[tokio::test]
    async fn invalid_arguments_are_invalid_params() {
        let srv = server(RecordingRunner::new());
        let resp = srv
            .handle_request(request(
                6,
                "tools/call",
                json!({"name": "container_start", "arguments": {}}),
            ))
            .await
            .unwrap();

        let error = resp.error.unwrap();
        assert_eq!(error.code, protocol::INVALID_PARAMS);
        assert!(error.message.contains("containerId"));
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let srv = server(RecordingRunner::new());
        let resp = srv
            .handle_request(request(7, "resources/list", json!({})))
            .await
            .unwrap();

        assert_eq!(resp.error.unwrap().code, protocol::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let srv = server(RecordingRunner::new());
        let req: Request = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized",
        }))
        .unwrap();
        assert!(srv.handle_request(req).await.is_none());
    }
}
