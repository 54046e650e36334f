//! mcp::tools::image
//!
//! The `image_*` tool group.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::mcp::protocol::RpcError;
use crate::runtime::{table, ArgBuilder, ExecOptions, Runner};

use super::{execute, parse_input, standard_opts, ToolDef, ToolOutcome};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildInput {
    context_dir: Option<String>,
    dockerfile: Option<String>,
    tag: Option<String>,
    #[serde(default)]
    build_args: Vec<String>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    no_cache: bool,
    target: Option<String>,
    #[serde(default)]
    quiet: bool,
    cpus: Option<String>,
    memory: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListInput {
    #[serde(default)]
    quiet: bool,
    #[serde(default)]
    verbose: bool,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferInput {
    reference: String,
    platform: Option<String>,
    scheme: Option<String>,
    #[serde(default)]
    disable_progress: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteInput {
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    all: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagInput {
    source: String,
    target: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InspectInput {
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveInput {
    reference: String,
    output: String,
    platform: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadInput {
    input: String,
}

/// Tool definitions for this group.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "image_build",
            description: "Build an image from a Dockerfile",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "contextDir": { "type": "string",
                                    "description": "Build context directory (default: current directory)" },
                    "dockerfile": { "type": "string",
                                    "description": "Path to Dockerfile (default: Dockerfile)" },
                    "tag": { "type": "string",
                             "description": "Name and optionally a tag in the \"name:tag\" format" },
                    "buildArgs": { "type": "array", "items": { "type": "string" },
                                   "description": "Build-time variables in KEY=VALUE format" },
                    "labels": { "type": "array", "items": { "type": "string" },
                                "description": "Set metadata for an image in KEY=VALUE format" },
                    "noCache": { "type": "boolean",
                                 "description": "Do not use cache when building the image" },
                    "target": { "type": "string", "description": "Set the target build stage to build" },
                    "quiet": { "type": "boolean",
                               "description": "Suppress the build output and print image ID on success" },
                    "cpus": { "type": "string",
                              "description": "Number of CPUs to allocate to the build container" },
                    "memory": { "type": "string", "description": "Memory limit for the build container" }
                }
            }),
        },
        ToolDef {
            name: "image_list",
            description: "List container images",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "quiet": { "type": "boolean", "description": "Only show image IDs" },
                    "verbose": { "type": "boolean", "description": "Show verbose output" },
                    "format": { "type": "string", "enum": ["json", "table"],
                                "description": "Format the output" }
                }
            }),
        },
        ToolDef {
            name: "image_pull",
            description: "Pull an image from a registry",
            input_schema: transfer_schema(),
        },
        ToolDef {
            name: "image_push",
            description: "Push an image to a registry",
            input_schema: transfer_schema(),
        },
        ToolDef {
            name: "image_delete",
            description: "Remove one or more images",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "images": { "type": "array", "items": { "type": "string" },
                                "description": "Image names or IDs to delete" },
                    "all": { "type": "boolean", "description": "Remove all images" }
                }
            }),
        },
        ToolDef {
            name: "image_tag",
            description: "Create a tag that refers to a source image",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "source": { "type": "string", "description": "Source image name or ID" },
                    "target": { "type": "string", "description": "Target image name and tag" }
                },
                "required": ["source", "target"]
            }),
        },
        ToolDef {
            name: "image_inspect",
            description: "Display detailed information about one or more images",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "images": { "type": "array", "items": { "type": "string" },
                                "description": "Image names or IDs" }
                },
                "required": ["images"]
            }),
        },
        ToolDef {
            name: "image_save",
            description: "Save one or more images to a tar archive",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "reference": { "type": "string", "description": "Image reference to save" },
                    "output": { "type": "string", "description": "Write to a file instead of STDOUT" },
                    "platform": { "type": "string",
                                  "description": "Platform in the form os/arch/variant" }
                },
                "required": ["reference", "output"]
            }),
        },
        ToolDef {
            name: "image_load",
            description: "Load an image from a tar archive",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "input": { "type": "string", "description": "Read from tar archive file" }
                },
                "required": ["input"]
            }),
        },
        ToolDef {
            name: "image_prune",
            description: "Remove unused images",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}

fn transfer_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "reference": { "type": "string", "description": "Image reference (name:tag)" },
            "platform": { "type": "string",
                          "description": "Platform in the form os/arch/variant (e.g., linux/arm64)" },
            "scheme": { "type": "string", "enum": ["http", "https", "auto"],
                        "description": "Scheme to use when connecting to the registry" },
            "disableProgress": { "type": "boolean", "description": "Disable progress bar updates" }
        },
        "required": ["reference"]
    })
}

/// Route an `image_*` call to its handler.
pub async fn handle(
    runner: &dyn Runner,
    name: &str,
    args: &Value,
) -> Result<ToolOutcome, RpcError> {
    match name {
        "image_build" => build(runner, name, args).await,
        "image_list" => list(runner, name, args).await,
        "image_pull" => transfer(runner, name, args, "pull").await,
        "image_push" => transfer(runner, name, args, "push").await,
        "image_delete" => delete(runner, name, args).await,
        "image_tag" => tag(runner, name, args).await,
        "image_inspect" => inspect(runner, name, args).await,
        "image_save" => save(runner, name, args).await,
        "image_load" => load(runner, name, args).await,
        "image_prune" => prune(runner).await,
        _ => Err(RpcError::method_not_found(format!("Unknown tool: {}", name))),
    }
}

async fn build(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: BuildInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["build"])
        .opt("file", input.dockerfile.as_ref())
        .opt("tag", input.tag.as_ref())
        .opt_each("build-arg", input.build_args.iter().cloned())
        .opt_each("label", input.labels.iter().cloned())
        .flag("no-cache", input.no_cache)
        .opt("target", input.target.as_ref())
        .flag("quiet", input.quiet)
        .opt("cpus", input.cpus.as_ref())
        .opt("memory", input.memory.as_ref())
        .arg(input.context_dir.as_deref().unwrap_or("."))
        .build();
    execute(runner, argv, &ExecOptions::with_timeout(runner.timeouts().build), false).await
}

async fn list(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: ListInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["images", "list"])
        .flag("quiet", input.quiet)
        .flag("verbose", input.verbose)
        .opt("format", input.format.as_ref())
        .build();
    let wants_json = input.format.as_deref() == Some("json");
    let mut outcome = execute(runner, argv, &standard_opts(runner), wants_json).await?;

    if outcome.success && !wants_json {
        let rows = table::parse(&outcome.output);
        outcome.data = Some(serde_json::to_value(rows).unwrap_or(Value::Null));
    }
    Ok(outcome)
}

async fn transfer(
    runner: &dyn Runner,
    tool: &str,
    args: &Value,
    verb: &str,
) -> Result<ToolOutcome, RpcError> {
    let input: TransferInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["images", verb])
        .opt("platform", input.platform.as_ref())
        .opt("scheme", input.scheme.as_ref())
        .flag("disable-progress-updates", input.disable_progress)
        .arg(&input.reference)
        .build();
    execute(runner, argv, &ExecOptions::with_timeout(runner.timeouts().transfer), false).await
}

async fn delete(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: DeleteInput = parse_input(tool, args)?;
    if !input.all && input.images.is_empty() {
        return Err(RpcError::invalid_params(format!(
            "Invalid parameters for {}: specify images to delete or set all",
            tool
        )));
    }
    let mut builder = ArgBuilder::new(["images", "delete"]).flag("all", input.all);
    if !input.all {
        builder = builder.args(input.images.iter().cloned());
    }
    execute(runner, builder.build(), &standard_opts(runner), false).await
}

async fn tag(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: TagInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["images", "tag"])
        .arg(&input.source)
        .arg(&input.target)
        .build();
    execute(runner, argv, &standard_opts(runner), false).await
}

async fn inspect(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: InspectInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["images", "inspect"])
        .args(input.images.iter().cloned())
        .build();
    execute(runner, argv, &standard_opts(runner), true).await
}

async fn save(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: SaveInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["images", "save"])
        .opt("platform", input.platform.as_ref())
        .opt("output", Some(&input.output))
        .arg(&input.reference)
        .build();
    execute(runner, argv, &ExecOptions::with_timeout(runner.timeouts().build), false).await
}

async fn load(runner: &dyn Runner, tool: &str, args: &Value) -> Result<ToolOutcome, RpcError> {
    let input: LoadInput = parse_input(tool, args)?;
    let argv = ArgBuilder::new(["images", "load"])
        .opt("input", Some(&input.input))
        .build();
    execute(runner, argv, &ExecOptions::with_timeout(runner.timeouts().build), false).await
}

async fn prune(runner: &dyn Runner) -> Result<ToolOutcome, RpcError> {
    let argv = ArgBuilder::new(["images", "prune"]).build();
    execute(runner, argv, &standard_opts(runner), false).await
}
