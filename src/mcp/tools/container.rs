//! mcp::tools::container
//!
//! The `container_*` tool group.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::mcp::protocol::RpcError;
use crate::runtime::{table, ArgBuilder, ExecOptions, Runner};

use super::{execute, parse_input, standard_opts, ToolDef, ToolOutcome};

/// Output format accepted by the list tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ListFormat {
    Json,
    Table,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateInput {
    image: String,
    name: Option<String>,
    workdir: Option<String>,
    #[serde(default)]
    env: Vec<String>,
    #[serde(default)]
    volumes: Vec<String>,
    #[serde(default)]
    ports: Vec<String>,
    #[serde(default)]
    interactive: bool,
    #[serde(default)]
    tty: bool,
    #[serde(default)]
    detach: bool,
    #[serde(default)]
    remove: bool,
    cpus: Option<String>,
    memory: Option<String>,
    entrypoint: Option<String>,
    network: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    arguments: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListInput {
    #[serde(default)]
    all: bool,
    #[serde(default)]
    quiet: bool,
    format: Option<ListFormat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartInput {
    container_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopInput {
    container_id: Option<String>,
    #[serde(default)]
    all: bool,
    signal: Option<String>,
    time: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KillInput {
    container_id: Option<String>,
    #[serde(default)]
    all: bool,
    signal: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteInput {
    container_id: Option<String>,
    #[serde(default)]
    all: bool,
    #[serde(default)]
    force: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecInput {
    container_id: String,
    command: Vec<String>,
    workdir: Option<String>,
    #[serde(default)]
    env: Vec<String>,
    #[serde(default)]
    interactive: bool,
    #[serde(default)]
    tty: bool,
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogsInput {
    container_id: String,
    #[serde(default)]
    follow: bool,
    tail: Option<u64>,
    #[serde(default)]
    boot: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InspectInput {
    container_id: String,
}

/// Tool definitions for this group.
pub fn tools() -> Vec<ToolDef> {
    let create_properties = json!({
        "image": { "type": "string", "description": "Container image name and tag" },
        "name": { "type": "string", "description": "Container name (optional)" },
        "workdir": { "type": "string", "description": "Working directory in the container" },
        "env": { "type": "array", "items": { "type": "string" },
                 "description": "Environment variables in KEY=VALUE format" },
        "volumes": { "type": "array", "items": { "type": "string" },
                     "description": "Volume mounts in host:container format" },
        "ports": { "type": "array", "items": { "type": "string" },
                   "description": "Port mappings in host:container format" },
        "interactive": { "type": "boolean", "description": "Keep STDIN open" },
        "tty": { "type": "boolean", "description": "Allocate a pseudo-TTY" },
        "remove": { "type": "boolean", "description": "Remove container after it stops" },
        "cpus": { "type": "string", "description": "Number of CPUs to allocate" },
        "memory": { "type": "string", "description": "Memory limit (e.g., 512M, 2G)" },
        "entrypoint": { "type": "string", "description": "Override the default entrypoint" },
        "network": { "type": "string", "description": "Network to attach the container to" },
        "labels": { "type": "array", "items": { "type": "string" },
                    "description": "Labels in KEY=VALUE format" },
        "arguments": { "type": "array", "items": { "type": "string" },
                       "description": "Command arguments to pass to the container" }
    });

    let mut run_properties = create_properties.clone();
    run_properties["detach"] =
        json!({ "type": "boolean", "description": "Run container in the background" });

    vec![
        ToolDef {
            name: "container_create",
            description: "Create a new container without starting it",
            input_schema: json!({
                "type": "object",
                "properties": create_properties,
                "required": ["image"]
            }),
        },
        ToolDef {
            name: "container_run",
            description: "Create and start a new container in one command",
            input_schema: json!({
                "type": "object",
                "properties": run_properties,
                "required": ["image"]
            }),
        },
        ToolDef {
            name: "container_list",
            description: "List containers",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "all": { "type": "boolean",
                             "description": "Show all containers including stopped ones" },
                    "quiet": { "type": "boolean", "description": "Only show container IDs" },
                    "format": { "type": "string", "enum": ["json", "table"],
                                "description": "Output format" }
                }
            }),
        },
        ToolDef {
            name: "container_start",
            description: "Start a stopped container",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" }
                },
                "required": ["containerId"]
            }),
        },
        ToolDef {
            name: "container_stop",
            description: "Stop a running container",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string",
                                     "description": "Container ID or name (required if not using --all)" },
                    "all": { "type": "boolean", "description": "Stop all running containers" },
                    "signal": { "type": "string", "description": "Signal to send to the container" },
                    "time": { "type": "number",
                              "description": "Seconds to wait before killing the container" }
                }
            }),
        },
        ToolDef {
            name: "container_kill",
            description: "Kill a running container",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string",
                                     "description": "Container ID or name (required if not using --all)" },
                    "all": { "type": "boolean", "description": "Kill all running containers" },
                    "signal": { "type": "string", "description": "Signal to send to the container" }
                }
            }),
        },
        ToolDef {
            name: "container_delete",
            description: "Delete one or more containers",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string",
                                     "description": "Container ID or name (required if not using --all)" },
                    "all": { "type": "boolean", "description": "Delete all containers" },
                    "force": { "type": "boolean", "description": "Force removal of running containers" }
                }
            }),
        },
        ToolDef {
            name: "container_exec",
            description: "Execute a command in a running container",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" },
                    "command": { "type": "array", "items": { "type": "string" },
                                 "description": "Command and arguments to execute" },
                    "workdir": { "type": "string", "description": "Working directory for the command" },
                    "env": { "type": "array", "items": { "type": "string" },
                             "description": "Environment variables in KEY=VALUE format" },
                    "interactive": { "type": "boolean", "description": "Keep STDIN open" },
                    "tty": { "type": "boolean", "description": "Allocate a pseudo-TTY" },
                    "user": { "type": "string",
                              "description": "Username or UID to run the command as" }
                },
                "required": ["containerId", "command"]
            }),
        },
        ToolDef {
            name: "container_logs",
            description: "Fetch container logs",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" },
                    "follow": { "type": "boolean", "description": "Follow log output (stream logs)" },
                    "tail": { "type": "number", "description": "Number of lines to show from the end" },
                    "boot": { "type": "boolean", "description": "Show boot logs instead of stdio" }
                },
                "required": ["containerId"]
            }),
        },
        ToolDef {
            name: "container_inspect",
            description: "Display detailed information about a container",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "containerId": { "type": "string", "description": "Container ID or name" }
                },
                "required": ["containerId"]
            }),
        },
    ]
}

/// Route a `container_*` call to its handler.
pub async fn handle(
    runner: &dyn Runner,
    name: &str,
    args: &Value,
) -> Result<ToolOutcome, RpcError> {
    match name {
        "container_create" => create(runner, name, args, "create").await,
        "container_run" => create(runner, name, args, "run").await,
        "container_list" => list(runner, name, args).await,
        "container_start" => start(runner, name, args).await,
        "container_stop" => stop(runner, name, args).await,
        "container_kill" => kill(runner, name, args).await,
        "container_delete" => delete(runner, name, args).await,
        "container_exec" => exec(runner, name, args).await,
        "container_logs" => logs(runner, name, args).await,
        "container_inspect" => inspect(runner, name, args).await,
        _ => Err(RpcError::method_not_found(format!("Unknown tool: {}", name))),
    }
}

fn create_argv(verb: &str, input: &CreateInput) -> Vec<String> {
    let mut builder = ArgBuilder::new([verb])
        .opt("workdir", input.workdir.as_ref())
        .opt_each("env", input.env.iter().cloned())
        .opt_each("volume", input.volumes.iter().cloned())
        .opt_each("publish", input.ports.iter().cloned())
        .flag("interactive", input.interactive)
        .flag("tty", input.tty)
        .flag("remove", input.remove)
        .opt("cpus", input.cpus.as_ref())
        .opt("memory", input.memory.as_ref())
        .opt("entrypoint", input.entrypoint.as_ref())
        .opt("network", input.network.as_ref())
        .opt("name", input.name.as_ref())
        .opt_each("label", input.labels.iter().cloned());
    if verb == "run" {
        builder = builder.flag("detach", input.detach);
    }
    builder
        .arg(&input.image)
        .args(input.arguments.iter().cloned())
        .build()
}

async fn create(
    runner: &dyn Runner,
    tool: &str,
    args: &Value,
    verb: &str,
) -> Result<ToolOutcome, RpcError> {
    let input: CreateInput = parse_input(tool, args)?;
    execute(runner, create_argv(verb, &input), &standard_opts(runner), false).await
}

async fn list(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: ListInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["list"])
        .flag("all", input.all)
        .flag("quiet", input.quiet)
        .opt(
            "format",
            input.format.map(|f| match f {
                ListFormat::Json => "json",
                ListFormat::Table => "table",
            }),
        )
        .build();
    let wants_json = input.format == Some(ListFormat::Json);
    let mut outcome = execute(runner, argv, &standard_opts(runner), wants_json).await?;

    // Table output still gets structured rows.
    if outcome.success && !wants_json {
        let rows = table::parse(&outcome.output);
        outcome.data = Some(serde_json::to_value(rows).unwrap_or(Value::Null));
    }
    Ok(outcome)
}

async fn start(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: StartInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["start"]).arg(&input.container_id).build();
    execute(runner, argv, &standard_opts(runner), false).await
}

fn target_or_all(
    tool: &str,
    container_id: Option<String>,
    all: bool,
) -> Result<Option<String>, RpcError> {
    if all {
        return Ok(None);
    }
    match container_id {
        Some(id) => Ok(Some(id)),
        None => Err(RpcError::invalid_params(format!(
            "Invalid parameters for {}: containerId is required unless all is set",
            tool
        ))),
    }
}

async fn stop(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: StopInput = parse_input(tool, args)?;
    let target = target_or_all(tool, input.container_id, input.all)?;
    let mut builder = ArgBuilder::new(["stop"])
        .opt("signal", input.signal.as_ref())
        .opt("time", input.time)
        .flag("all", input.all);
    if let Some(id) = target {
        builder = builder.arg(id);
    }
    execute(runner, builder.build(), &standard_opts(runner), false).await
}

async fn kill(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: KillInput = parse_input(tool, args)?;
    let target = target_or_all(tool, input.container_id, input.all)?;
    let mut builder = ArgBuilder::new(["kill"])
        .opt("signal", input.signal.as_ref())
        .flag("all", input.all);
    if let Some(id) = target {
        builder = builder.arg(id);
    }
    execute(runner, builder.build(), &standard_opts(runner), false).await
}

async fn delete(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: DeleteInput = parse_input(tool, args)?;
    let target = target_or_all(tool, input.container_id, input.all)?;
    let mut builder = ArgBuilder::new(["delete"])
        .flag("force", input.force)
        .flag("all", input.all);
    if let Some(id) = target {
        builder = builder.arg(id);
    }
    execute(runner, builder.build(), &standard_opts(runner), false).await
}

async fn exec(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: ExecInput = parse_input(tool, args)?;
    if input.command.is_empty() {
        return Err(RpcError::invalid_params(format!(
            "Invalid parameters for {}: command must not be empty",
            tool
        )));
    }
    let argv = ArgBuilder::new(["exec"])
        .opt("cwd", input.workdir.as_ref())
        .opt_each("env", input.env.iter().cloned())
        .flag("interactive", input.interactive)
        .flag("tty", input.tty)
        .opt("user", input.user.as_ref())
        .arg(&input.container_id)
        .args(input.command.iter().cloned())
        .build();
    execute(runner, argv, &standard_opts(runner), false).await
}

async fn logs(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: LogsInput = parse_input(tool, args)?;
    let mut builder = ArgBuilder::new(["logs"])
        .flag("follow", input.follow)
        .flag("boot", input.boot);
    if let Some(n) = input.tail {
        builder = builder.arg("-n").arg(n.to_string());
    }
    let argv = builder.arg(&input.container_id).build();

    if input.follow {
        collect_stream(runner, argv).await
    } else {
        execute(runner, argv, &standard_opts(runner), false).await
    }
}

async fn inspect(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: InspectInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["inspect"]).arg(&input.container_id).build();
    execute(runner, argv, &standard_opts(runner), true).await
}

/// Run a streaming command to completion, collecting everything it emits.
pub(super) async fn collect_stream(
    runner: &dyn Runner,
    argv: Vec<String>,
) -> Result<ToolOutcome, RpcError> {
    let mut stream = runner
        .stream(&argv, &ExecOptions::unbounded())
        .await
        .map_err(|e| RpcError::internal(e.to_string()))?;

    // Drain so the channel never fills; final text comes from wait().
    while stream.next_chunk().await.is_some() {}

    let output = stream
        .wait()
        .await
        .map_err(|e| RpcError::internal(e.to_string()))?;
    Ok(ToolOutcome {
        success: output.success,
        exit_code: (!output.success).then_some(output.exit_code),
        error: {
            let err = output.stderr.trim();
            (!err.is_empty()).then(|| err.to_string())
        },
        output: output.stdout,
        data: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RecordingRunner;
    use serde_json::json;

    #[tokio::test]
    async fn create_builds_full_argv() {
        let runner = RecordingRunner::new();
        runner.respond_ok(&["create"], "abc123");

        handle(
            &runner,
            "container_create",
            &json!({
                "image": "nginx:latest",
                "name": "web",
                "env": ["A=1", "B=2"],
                "volumes": ["/host:/ctr"],
                "cpus": "2",
                "arguments": ["nginx", "-g", "daemon off;"]
            }),
        )
        .await
        .unwrap();

        assert_eq!(
            runner.calls()[0],
            vec![
                "create", "--env", "A=1", "--env", "B=2", "--volume", "/host:/ctr",
                "--cpus", "2", "--name", "web", "nginx:latest", "nginx", "-g", "daemon off;"
            ]
        );
    }

    #[tokio::test]
    async fn run_adds_detach() {
        let runner = RecordingRunner::new();
        runner.respond_ok(&["run"], "");

        handle(
            &runner,
            "container_run",
            &json!({"image": "alpine:latest", "detach": true}),
        )
        .await
        .unwrap();

        assert_eq!(runner.calls()[0], vec!["run", "--detach", "alpine:latest"]);
    }

    #[tokio::test]
    async fn list_table_output_gets_structured_rows() {
        let runner = RecordingRunner::new();
        runner.respond_ok(&["list"], "ID  IMAGE\nweb  nginx:latest\n");

        let outcome = handle(&runner, "container_list", &json!({"all": true}))
            .await
            .unwrap();

        assert_eq!(runner.calls()[0], vec!["list", "--all"]);
        let rows = outcome.data.unwrap();
        assert_eq!(rows[0]["id"], "web");
        assert_eq!(rows[0]["image"], "nginx:latest");
    }

    #[tokio::test]
    async fn stop_without_target_is_invalid_params() {
        let runner = RecordingRunner::new();
        let err = handle(&runner, "container_stop", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::mcp::protocol::INVALID_PARAMS);
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn stop_all_omits_target() {
        let runner = RecordingRunner::new();
        runner.respond_ok(&["stop"], "");

        handle(
            &runner,
            "container_stop",
            &json!({"all": true, "signal": "SIGTERM", "time": 10}),
        )
        .await
        .unwrap();

        assert_eq!(
            runner.calls()[0],
            vec!["stop", "--signal", "SIGTERM", "--time", "10", "--all"]
        );
    }

    #[tokio::test]
    async fn exec_appends_command_after_id() {
        let runner = RecordingRunner::new();
        runner.respond_ok(&["exec"], "");

        handle(
            &runner,
            "container_exec",
            &json!({
                "containerId": "web",
                "command": ["ls", "-la"],
                "workdir": "/srv",
                "tty": true
            }),
        )
        .await
        .unwrap();

        assert_eq!(
            runner.calls()[0],
            vec!["exec", "--cwd", "/srv", "--tty", "web", "ls", "-la"]
        );
    }

    #[tokio::test]
    async fn logs_follow_collects_stream() {
        let runner = RecordingRunner::new();
        runner.respond_stream_lines(&["line one", "line two"]);

        let outcome = handle(
            &runner,
            "container_logs",
            &json!({"containerId": "web", "follow": true, "tail": 50}),
        )
        .await
        .unwrap();

        assert!(outcome.success);
        assert!(outcome.output.contains("line one"));
        assert_eq!(
            runner.calls()[0],
            vec!["logs", "--follow", "-n", "50", "web"]
        );
    }

    #[tokio::test]
    async fn missing_required_field_is_invalid_params() {
        let runner = RecordingRunner::new();
        let err = handle(&runner, "container_start", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::mcp::protocol::INVALID_PARAMS);
        assert!(err.message.contains("containerId"));
    }

    #[tokio::test]
    async fn unknown_suffix_is_method_not_found() {
        let runner = RecordingRunner::new();
        let err = handle(&runner, "container_bogus", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::mcp::protocol::METHOD_NOT_FOUND);
    }
}
