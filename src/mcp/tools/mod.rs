//! mcp::tools
//!
//! Tool registry and shared handler plumbing.
//!
//! # Architecture
//!
//! Three handler groups mirror the runtime's command families:
//! [`container`] (`container_*`), [`image`] (`image_*`), and [`system`]
//! (`system_*`, `registry_*`, `builder_*`). Each group exposes its tool
//! definitions for `tools/list` and a `handle` function that validates
//! the call's arguments, builds an argument array, and executes it.
//!
//! Input structs use serde for validation; a deserialization failure
//! becomes a JSON-RPC invalid-params error whose message names the
//! offending field.

pub mod container;
pub mod image;
pub mod system;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::mcp::protocol::RpcError;
use crate::runtime::{CommandOutput, ExecOptions, Runner, RuntimeError};

/// One advertised tool.
#[derive(Debug, Clone)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

impl ToolDef {
    /// The `tools/list` wire shape.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }
}

/// Every tool the server advertises, in listing order.
pub fn catalog() -> Vec<ToolDef> {
    let mut tools = container::tools();
    tools.extend(image::tools());
    tools.extend(system::tools());
    tools
}

/// Result of running one tool, before formatting.
#[derive(Debug, Clone, Default)]
pub struct ToolOutcome {
    pub success: bool,
    /// Exit code, reported only on failure.
    pub exit_code: Option<i32>,
    /// Captured stdout.
    pub output: String,
    /// Captured stderr, when non-empty.
    pub error: Option<String>,
    /// Parsed structured payload, when the tool requested JSON.
    pub data: Option<Value>,
}

/// Parse tool arguments into a typed input.
pub(crate) fn parse_input<T: DeserializeOwned>(tool: &str, args: &Value) -> Result<T, RpcError> {
    serde_json::from_value(args.clone()).map_err(|e| {
        RpcError::invalid_params(format!("Invalid parameters for {}: {}", tool, e))
    })
}

/// Execution options for a one-shot tool command, using the runner's
/// default timeout class.
pub(crate) fn standard_opts(runner: &dyn Runner) -> ExecOptions {
    ExecOptions::with_timeout(runner.timeouts().default)
}

/// Execute an argument array and fold the output into a [`ToolOutcome`].
///
/// A non-zero exit is a *result* (success=false), not a protocol error;
/// only failures to run the command at all become internal errors.
pub(crate) async fn execute(
    runner: &dyn Runner,
    args: Vec<String>,
    opts: &ExecOptions,
    parse_json: bool,
) -> Result<ToolOutcome, RpcError> {
    match runner.execute(&args, opts).await {
        Ok(output) => Ok(outcome_from(output, parse_json)),
        Err(RuntimeError::Timeout(limit)) => Ok(ToolOutcome {
            success: false,
            exit_code: None,
            output: String::new(),
            error: Some(format!("command timed out after {:?}", limit)),
            data: None,
        }),
        Err(e) => Err(RpcError::internal(e.to_string())),
    }
}

fn outcome_from(output: CommandOutput, parse_json: bool) -> ToolOutcome {
    let data = if parse_json && output.success && !output.stdout.trim().is_empty() {
        serde_json::from_str(output.stdout.trim()).ok()
    } else {
        None
    };
    ToolOutcome {
        success: output.success,
        exit_code: (!output.success).then_some(output.exit_code),
        error: {
            let err = output.stderr.trim();
            (!err.is_empty()).then(|| err.to_string())
        },
        output: output.stdout,
        data,
    }
}
