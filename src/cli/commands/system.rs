//! cli::commands::system
//!
//! System service handlers.

use anyhow::Result;

use crate::cli::args::SystemCommand;
use crate::model::SystemStatus;
use crate::ops::logs;
use crate::ops::system::{self, StartOptions};
use crate::ops::OpsError;
use crate::runtime::StreamSource;

use super::Context;

pub fn dispatch(command: SystemCommand, ctx: &Context) -> Result<()> {
    match command {
        SystemCommand::Status => status(ctx),
        SystemCommand::Start {
            path,
            enable_kernel_install,
            disable_kernel_install,
        } => start(ctx, path, enable_kernel_install, disable_kernel_install),
        SystemCommand::Stop { prefix } => stop(ctx, prefix),
        SystemCommand::Logs { last, follow } => system_logs(ctx, last, follow),
    }
}

fn status(ctx: &Context) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(system::status(runner.as_ref()));

    ctx.finish(result, |ctx, status| {
        let line = match status {
            SystemStatus::Running => "System is running.",
            SystemStatus::NotRunning => "System is not running. Start it with 'stowage system start'.",
            SystemStatus::NotRegistered => {
                "Container runtime not found. Is it installed and on PATH?"
            }
        };
        ctx.print(line);
    })
}

fn start(
    ctx: &Context,
    path: Option<String>,
    enable_kernel_install: bool,
    disable_kernel_install: bool,
) -> Result<()> {
    let kernel_install = if enable_kernel_install {
        Some(true)
    } else if disable_kernel_install {
        Some(false)
    } else {
        None
    };
    let opts = StartOptions {
        path,
        debug: ctx.verbosity == crate::ui::output::Verbosity::Debug,
        kernel_install,
    };

    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(system::start(runner.as_ref(), &opts));

    ctx.finish(result, |ctx, report| {
        if !report.is_empty() {
            ctx.print(report);
        }
        ctx.print("System started.");
    })
}

fn stop(ctx: &Context, prefix: Option<String>) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(system::stop(runner.as_ref(), prefix.as_deref()));

    ctx.finish(result, |ctx, ()| {
        ctx.print("System stopped.");
    })
}

fn system_logs(ctx: &Context, last: Option<String>, follow: bool) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;

    if follow {
        rt.block_on(async {
            let mut session = logs::follow_system(runner.as_ref(), last.as_deref()).await?;
            while let Some(chunk) = session.next_line().await {
                match chunk.source {
                    StreamSource::Stdout => println!("{}", chunk.line),
                    StreamSource::Stderr => eprintln!("{}", chunk.line),
                }
            }
            session.wait().await?;
            Ok::<_, OpsError>(())
        })?;
        return Ok(());
    }

    let result = rt.block_on(logs::fetch_system(runner.as_ref(), last.as_deref()));
    ctx.finish(result, |_ctx, text| {
        if !text.is_empty() {
            println!("{}", text);
        }
    })
}
