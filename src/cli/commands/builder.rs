//! cli::commands::builder
//!
//! BuildKit builder handlers. Payloads are opaque text from the runtime,
//! so these shell straight through without a typed ops layer.

use anyhow::Result;

use crate::cli::args::BuilderCommand;
use crate::ops::{self, OpsError};
use crate::runtime::{ArgBuilder, ExecOptions, Runner};
use crate::ui::prompts;

use super::Context;

pub fn dispatch(command: BuilderCommand, ctx: &Context) -> Result<()> {
    match command {
        BuilderCommand::Start { cpus, memory } => start(ctx, cpus, memory),
        BuilderCommand::Stop => stop(ctx),
        BuilderCommand::Status => status(ctx),
        BuilderCommand::Delete { force } => delete(ctx, force),
    }
}

fn start(ctx: &Context, cpus: Option<String>, memory: Option<String>) -> Result<()> {
    let args = ArgBuilder::new(["builder", "start"])
        .opt("cpus", cpus)
        .opt("memory", memory)
        .build();

    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(run_text(runner.as_ref(), args));

    ctx.finish(result, |ctx, _report| {
        ctx.print("Builder started.");
    })
}

fn stop(ctx: &Context) -> Result<()> {
    let args = ArgBuilder::new(["builder", "stop"]).build();

    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(run_text(runner.as_ref(), args));

    ctx.finish(result, |ctx, _report| {
        ctx.print("Builder stopped.");
    })
}

fn status(ctx: &Context) -> Result<()> {
    // In --json mode ask the runtime for JSON directly so the envelope
    // carries structured data.
    let args = ArgBuilder::new(["builder", "status"])
        .flag("json", ctx.json)
        .build();

    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;

    if ctx.json {
        let result = rt.block_on(async {
            let opts = ExecOptions::with_timeout(runner.timeouts().default);
            let output = ops::run(runner.as_ref(), args, &opts).await?;
            Ok::<serde_json::Value, OpsError>(output.json()?)
        });
        return ctx.finish(result, |_ctx, _value| {});
    }

    let result = rt.block_on(run_text(runner.as_ref(), args));
    ctx.finish(result, |ctx, report| {
        ctx.print(report);
    })
}

fn delete(ctx: &Context, force: bool) -> Result<()> {
    if !force && ctx.interactive {
        let confirmed = prompts::confirm("Delete the builder?", false, ctx.interactive)?;
        if !confirmed {
            ctx.print("Aborted.");
            return Ok(());
        }
    }

    let args = ArgBuilder::new(["builder", "delete"])
        .flag("force", force)
        .build();

    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(run_text(runner.as_ref(), args));

    ctx.finish(result, |ctx, _report| {
        ctx.print("Builder deleted.");
    })
}

async fn run_text(runner: &dyn Runner, args: Vec<String>) -> Result<String, OpsError> {
    let opts = ExecOptions::with_timeout(runner.timeouts().default);
    let output = ops::run(runner, args, &opts).await?;
    Ok(output.stdout.trim().to_string())
}
