//! mcp::tools::system
//!
//! The `system_*`, `registry_*`, and `builder_*` tool groups, which share
//! one dispatch table.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::mcp::protocol::RpcError;
use crate::runtime::{ArgBuilder, ExecOptions, Runner};

use super::{container::collect_stream, execute, parse_input, standard_opts, ToolDef, ToolOutcome};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrefixInput {
    prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SystemStartInput {
    path: Option<String>,
    #[serde(default)]
    debug: bool,
    enable_kernel_install: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SystemLogsInput {
    last: Option<String>,
    #[serde(default)]
    follow: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryLoginInput {
    server: String,
    username: Option<String>,
    password: Option<String>,
    #[serde(default)]
    password_stdin: bool,
    scheme: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryLogoutInput {
    registry: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryDefaultSetInput {
    host: String,
    scheme: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuilderStartInput {
    cpus: Option<String>,
    memory: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuilderStatusInput {
    #[serde(default)]
    json: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuilderDeleteInput {
    #[serde(default)]
    force: bool,
}

/// Tool definitions for this group.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "system_status",
            description: "Show the status of container services",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "prefix": { "type": "string",
                                "description": "Launchd prefix for container services" }
                }
            }),
        },
        ToolDef {
            name: "system_start",
            description: "Start container services",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string",
                              "description": "Path to the container-apiserver binary" },
                    "debug": { "type": "boolean",
                               "description": "Enable debug logging for the runtime daemon" },
                    "enableKernelInstall": { "type": "boolean",
                                             "description": "Enable automatic kernel installation" }
                }
            }),
        },
        ToolDef {
            name: "system_stop",
            description: "Stop all container services",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "prefix": { "type": "string",
                                "description": "Launchd prefix for container services" }
                }
            }),
        },
        ToolDef {
            name: "system_logs",
            description: "Fetch system logs for container services",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "last": { "type": "string",
                              "description": "Fetch logs from specified time period (e.g., 5m, 1h, 1d)" },
                    "follow": { "type": "boolean", "description": "Follow log output" }
                }
            }),
        },
        ToolDef {
            name: "registry_login",
            description: "Login to a container registry",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "server": { "type": "string", "description": "Registry server URL" },
                    "username": { "type": "string", "description": "Username for authentication" },
                    "password": { "type": "string", "description": "Password for authentication" },
                    "passwordStdin": { "type": "boolean",
                                       "description": "Take the password from stdin" },
                    "scheme": { "type": "string", "enum": ["http", "https", "auto"],
                                "description": "Scheme to use when connecting to the registry" }
                },
                "required": ["server"]
            }),
        },
        ToolDef {
            name: "registry_logout",
            description: "Log out from a container registry",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "registry": { "type": "string", "description": "Registry to log out from" }
                },
                "required": ["registry"]
            }),
        },
        ToolDef {
            name: "registry_default_set",
            description: "Set the default container registry",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "host": { "type": "string", "description": "Registry host to set as default" },
                    "scheme": { "type": "string", "enum": ["http", "https", "auto"],
                                "description": "Scheme to use when connecting to the registry" }
                },
                "required": ["host"]
            }),
        },
        ToolDef {
            name: "registry_default_unset",
            description: "Unset the default container registry",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDef {
            name: "registry_default_inspect",
            description: "Display the default registry domain",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDef {
            name: "builder_start",
            description: "Start the image builder",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "cpus": { "type": "string",
                              "description": "Number of CPUs to allocate to the builder" },
                    "memory": { "type": "string",
                                "description": "Amount of memory to allocate to the builder" }
                }
            }),
        },
        ToolDef {
            name: "builder_stop",
            description: "Stop the image builder",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDef {
            name: "builder_status",
            description: "Print builder status",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "json": { "type": "boolean",
                              "description": "Display detailed status in JSON format" }
                }
            }),
        },
        ToolDef {
            name: "builder_delete",
            description: "Delete the image builder",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "force": { "type": "boolean",
                               "description": "Force delete builder even if it is running" }
                }
            }),
        },
    ]
}

/// Route a `system_*`/`registry_*`/`builder_*` call to its handler.
pub async fn handle(
    runner: &dyn Runner,
    name: &str,
    args: &Value,
) -> Result<ToolOutcome, RpcError> {
    match name {
        "system_status" => prefixed(runner, name, args, &["system", "status"]).await,
        "system_start" => system_start(runner, name, args).await,
        "system_stop" => prefixed(runner, name, args, &["system", "stop"]).await,
        "system_logs" => system_logs(runner, name, args).await,
        "registry_login" => registry_login(runner, name, args).await,
        "registry_logout" => registry_logout(runner, name, args).await,
        "registry_default_set" => registry_default_set(runner, name, args).await,
        "registry_default_unset" => {
            let argv = ArgBuilder::new(["registry", "default", "unset"]).build();
            execute(runner, argv, &standard_opts(runner), false).await
        }
        "registry_default_inspect" => {
            let argv = ArgBuilder::new(["registry", "default", "inspect"]).build();
            execute(runner, argv, &standard_opts(runner), false).await
        }
        "builder_start" => builder_start(runner, name, args).await,
        "builder_stop" => {
            let argv = ArgBuilder::new(["builder", "stop"]).build();
            execute(runner, argv, &standard_opts(runner), false).await
        }
        "builder_status" => builder_status(runner, name, args).await,
        "builder_delete" => builder_delete(runner, name, args).await,
        _ => Err(RpcError::method_not_found(format!("Unknown tool: {}", name))),
    }
}

/// `system status` / `system stop` differ only in the base command.
async fn prefixed(
    runner: &dyn Runner,
    tool: &str,
    args: &Value,
    base: &[&str],
) -> Result<ToolOutcome, RpcError> {
    let input: PrefixInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(base.iter().copied())
        .opt("prefix", input.prefix.as_ref())
        .build();
    execute(runner, argv, &standard_opts(runner), false).await
}

async fn system_start(
    runner: &dyn Runner,
    tool: &str,
    args: &Value,
) -> Result<ToolOutcome, RpcError> {
    let input: SystemStartInput = parse_input(tool, args)?;
    let mut builder = ArgBuilder::new(["system", "start"])
        .opt("path", input.path.as_ref())
        .flag("debug", input.debug);
    if let Some(enable) = input.enable_kernel_install {
        builder = builder.flag(
            if enable {
                "enable-kernel-install"
            } else {
                "disable-kernel-install"
            },
            true,
        );
    }
    execute(runner, builder.build(), &standard_opts(runner), false).await
}

async fn system_logs(
    runner: &dyn Runner,
    tool: &str,
    args: &Value,
) -> Result<ToolOutcome, RpcError> {
    let input: SystemLogsInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["system", "logs"])
        .opt("last", input.last.as_ref())
        .flag("follow", input.follow)
        .build();
    if input.follow {
        collect_stream(runner, argv).await
    } else {
        execute(runner, argv, &standard_opts(runner), false).await
    }
}

async fn registry_login(
    runner: &dyn Runner,
    tool: &str,
    args: &Value,
) -> Result<ToolOutcome, RpcError> {
    let input: RegistryLoginInput = parse_input(tool, args)?;
    let use_stdin = input.password_stdin || input.password.is_some();
    let argv = ArgBuilder::new(["registry", "login"])
        .opt("username", input.username.as_ref())
        .flag("password-stdin", use_stdin)
        .opt("scheme", input.scheme.as_ref())
        .arg(&input.server)
        .build();

    // Credentials travel over stdin, never through argv or environment.
    let opts = ExecOptions {
        stdin: input.password.clone(),
        ..standard_opts(runner)
    };
    execute(runner, argv, &opts, false).await
}

async fn registry_logout(
    runner: &dyn Runner,
    tool: &str,
    args: &Value,
) -> Result<ToolOutcome, RpcError> {
    let input: RegistryLogoutInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["registry", "logout"])
        .arg(&input.registry)
        .build();
    execute(runner, argv, &standard_opts(runner), false).await
}

async fn registry_default_set(
    runner: &dyn Runner,
    tool: &str,
    args: &Value,
) -> Result<ToolOutcome, RpcError> {
    let input: RegistryDefaultSetInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["registry", "default", "set"])
        .opt("scheme", input.scheme.as_ref())
        .arg(&input.host)
        .build();
    execute(runner, argv, &standard_opts(runner), false).await
}

async fn builder_start(
    runner: &dyn Runner,
    tool: &str,
    args: &Value,
) -> Result<ToolOutcome, RpcError> {
    let input: BuilderStartInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["builder", "start"])
        .opt("cpus", input.cpus.as_ref())
        .opt("memory", input.memory.as_ref())
        .build();
    execute(runner, argv, &standard_opts(runner), false).await
}

async fn builder_status(
    runner: &dyn Runner,
    tool: &str,
    args: &Value,
) -> Result<ToolOutcome, RpcError> {
    let input: BuilderStatusInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["builder", "status"])
        .flag("json", input.json)
        .build();
    execute(runner, argv, &standard_opts(runner), input.json).await
}

async fn builder_delete(
    runner: &dyn Runner,
    tool: &str,
    args: &Value,
) -> Result<ToolOutcome, RpcError> {
    let input: BuilderDeleteInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["builder", "delete"])
        .flag("force", input.force)
        .build();
    execute(runner, argv, &standard_opts(runner), false).await
}
