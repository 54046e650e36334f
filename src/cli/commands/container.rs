//! cli::commands::container
//!
//! Container lifecycle handlers.

use anyhow::{bail, Context as _, Result};

use crate::cli::args::ContainerCommand;
use crate::model::{ContainerRecord, Signal};
use crate::ops::containers::{self, StopOptions};
use crate::ops::logs::{self, LogRequest};
use crate::ops::OpsError;
use crate::runtime::{ArgBuilder, ExecOptions, StreamSource};
use crate::ui::output::format_row;
use crate::ui::prompts;

use super::Context;

pub fn dispatch(command: ContainerCommand, ctx: &Context) -> Result<()> {
    match command {
        ContainerCommand::List => list(ctx),
        ContainerCommand::Inspect { id } => inspect(ctx, &id),
        ContainerCommand::Start { id } => start(ctx, &id),
        ContainerCommand::Stop { id, signal, time } => stop(ctx, &id, signal, time),
        ContainerCommand::Kill { id, signal } => kill(ctx, &id, signal),
        ContainerCommand::Delete { id, force } => delete(ctx, &id, force),
        ContainerCommand::Logs {
            id,
            follow,
            tail,
            boot,
        } => container_logs(ctx, &id, follow, tail, boot),
        ContainerCommand::Exec {
            id,
            cwd,
            env,
            interactive,
            tty,
            user,
            command,
        } => exec(ctx, &id, cwd, env, interactive, tty, user, command),
        ContainerCommand::Reveal { id } => reveal(ctx, &id),
    }
}

fn list(ctx: &Context) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(containers::list(runner.as_ref()));

    ctx.finish(result, |ctx, records| {
        if records.is_empty() {
            ctx.print("No containers.");
            return;
        }
        let widths = [12, 40, 8];
        ctx.print(format_row(&["ID", "IMAGE", "STATUS", "ADDRESS"], &widths));
        for record in records {
            ctx.print(format_row(
                &[
                    record.id(),
                    &record.configuration.image.reference,
                    &record.status.to_string(),
                    &primary_address(record),
                ],
                &widths,
            ));
        }
    })
}

fn primary_address(record: &ContainerRecord) -> String {
    record
        .networks
        .first()
        .map(|n| n.address.clone())
        .unwrap_or_default()
}

fn inspect(ctx: &Context, id: &str) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(containers::get(runner.as_ref(), id));

    ctx.finish(result, |ctx, record| {
        // Human mode prints the record as pretty JSON; there is no better
        // rendering for a full configuration.
        match serde_json::to_string_pretty(record) {
            Ok(text) => ctx.print(text),
            Err(e) => ctx.print(format!("{:?} ({})", record.id(), e)),
        }
    })
}

fn start(ctx: &Context, id: &str) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(containers::start(runner.as_ref(), id));

    ctx.finish(result, |ctx, record| {
        ctx.print(format!("Started '{}' ({})", record.id(), record.status));
    })
}

fn stop(ctx: &Context, id: &str, signal: Signal, time_secs: u64) -> Result<()> {
    let runner = ctx.runner();
    let opts = StopOptions {
        signal,
        timeout_ms: time_secs.saturating_mul(1000),
    };
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(containers::stop(runner.as_ref(), id, &opts));

    ctx.finish(result, |ctx, record| {
        ctx.print(format!("Stopped '{}' ({})", record.id(), record.status));
    })
}

fn kill(ctx: &Context, id: &str, signal: Signal) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(containers::kill(runner.as_ref(), id, signal));

    ctx.finish(result, |ctx, record| {
        ctx.print(format!("Killed '{}' ({})", record.id(), record.status));
    })
}

fn delete(ctx: &Context, id: &str, force: bool) -> Result<()> {
    if !force && ctx.interactive {
        let confirmed = prompts::confirm(
            &format!("Delete container '{}'? It will be stopped if running.", id),
            false,
            ctx.interactive,
        )?;
        if !confirmed {
            ctx.print("Aborted.");
            return Ok(());
        }
    }

    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(containers::delete(runner.as_ref(), id));

    ctx.finish(result, |ctx, record| {
        ctx.print(format!("Deleted '{}'", record.id()));
    })
}

fn container_logs(ctx: &Context, id: &str, follow: bool, tail: Option<u64>, boot: bool) -> Result<()> {
    let runner = ctx.runner();
    let req = LogRequest {
        container: id.to_string(),
        follow,
        tail,
        boot,
    };

    let rt = tokio::runtime::Runtime::new()?;
    if follow {
        rt.block_on(async {
            let mut session = logs::follow(runner.as_ref(), &req).await?;
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

    let result = rt.block_on(logs::fetch(runner.as_ref(), &req));
    ctx.finish(result, |_ctx, text| {
        if !text.is_empty() {
            println!("{}", text);
        }
    })
}

#[allow(clippy::too_many_arguments)]
fn exec(
    ctx: &Context,
    id: &str,
    cwd: Option<String>,
    env: Vec<String>,
    interactive: bool,
    tty: bool,
    user: Option<String>,
    command: Vec<String>,
) -> Result<()> {
    if command.is_empty() {
        bail!("exec requires a command to run");
    }

    let args = ArgBuilder::new(["exec"])
        .opt("cwd", cwd)
        .opt_each("env", env)
        .flag("interactive", interactive)
        .flag("tty", tty)
        .opt("user", user)
        .arg(id)
        .args(command)
        .build();

    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        let opts = ExecOptions::with_timeout(runner.timeouts().default);
        let output = runner.execute(&args, &opts).await?;
        if !output.success {
            return Err(OpsError::Failed(output.error_message()));
        }
        Ok(output.stdout)
    });

    ctx.finish(result, |_ctx, stdout| {
        if !stdout.is_empty() {
            print!("{}", stdout);
        }
    })
}

fn reveal(ctx: &Context, id: &str) -> Result<()> {
    // Resolve through the runtime first so a typo'd ID fails loudly
    // instead of opening an empty directory.
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let record = rt.block_on(containers::get(runner.as_ref(), id))?;

    let dir = ctx.config.container_dir(record.id())?;
    if !dir.exists() {
        bail!(
            "no data directory for container '{}' at {}",
            record.id(),
            dir.display()
        );
    }

    open::that(&dir).with_context(|| format!("cannot open {}", dir.display()))?;
    ctx.print(format!("Opened {}", dir.display()));
    Ok(())
}
