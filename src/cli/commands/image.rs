//! cli::commands::image
//!
//! Image handlers: listing, transfers, tagging, archives, builds.

use anyhow::Result;

use crate::cli::args::ImageCommand;
use crate::ops::images::{self, BuildRequest, TransferRequest};
use crate::ui::output::{format_row, short_digest};

use super::Context;

pub fn dispatch(command: ImageCommand, ctx: &Context) -> Result<()> {
    match command {
        ImageCommand::List => list(ctx),
        ImageCommand::Pull {
            reference,
            platform,
            scheme,
            disable_progress,
        } => pull(ctx, reference, platform, scheme, disable_progress),
        ImageCommand::Push {
            reference,
            platform,
            scheme,
            disable_progress,
        } => push(ctx, reference, platform, scheme, disable_progress),
        ImageCommand::Tag { source, target } => tag(ctx, &source, &target),
        ImageCommand::Delete { references, all } => delete(ctx, references, all),
        ImageCommand::Save {
            reference,
            output,
            platform,
        } => save(ctx, &reference, &output, platform.as_deref()),
        ImageCommand::Load { input } => load(ctx, &input),
        ImageCommand::Prune => prune(ctx),
        ImageCommand::Inspect { references } => inspect(ctx, references),
        ImageCommand::Build {
            context,
            file,
            tag,
            build_args,
            labels,
            no_cache,
            target,
            cpus,
            memory,
        } => build(
            ctx,
            BuildRequest {
                context_dir: context,
                dockerfile: file,
                tag,
                build_args,
                labels,
                no_cache,
                target,
                quiet: ctx.verbosity == crate::ui::output::Verbosity::Quiet,
                cpus,
                memory,
            },
        ),
    }
}

fn list(ctx: &Context) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(images::list(&runner));

    ctx.finish(result, |ctx, records| {
        if records.is_empty() {
            ctx.print("No images.");
            return;
        }
        let widths = [40, 20, 10];
        ctx.print(format_row(&["REFERENCE", "DIGEST", "VARIANTS", "SIZE"], &widths));
        for record in records {
            ctx.print(format_row(
                &[
                    &record.references.join(","),
                    &short_digest(&record.digest),
                    &record.variants.len().to_string(),
                    &human_size(record.total_size()),
                ],
                &widths,
            ));
        }
    })
}

fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn pull(
    ctx: &Context,
    reference: String,
    platform: Option<String>,
    scheme: Option<String>,
    disable_progress: bool,
) -> Result<()> {
    let req = TransferRequest {
        reference,
        platform,
        scheme,
        disable_progress,
    };
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(images::pull(runner.as_ref(), &req));

    ctx.finish(result, |ctx, report| {
        if !report.is_empty() {
            ctx.print(report);
        }
        ctx.print(format!("Pulled {}", req.reference));
    })
}

fn push(
    ctx: &Context,
    reference: String,
    platform: Option<String>,
    scheme: Option<String>,
    disable_progress: bool,
) -> Result<()> {
    let req = TransferRequest {
        reference,
        platform,
        scheme,
        disable_progress,
    };
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(images::push(runner.as_ref(), &req));

    ctx.finish(result, |ctx, report| {
        if !report.is_empty() {
            ctx.print(report);
        }
        ctx.print(format!("Pushed {}", req.reference));
    })
}

fn tag(ctx: &Context, source: &str, target: &str) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(images::tag(runner.as_ref(), source, target));

    ctx.finish(result, |ctx, ()| {
        ctx.print(format!("Tagged {} as {}", source, target));
    })
}

fn delete(ctx: &Context, references: Vec<String>, all: bool) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(images::delete(runner.as_ref(), &references, all));

    ctx.finish(result, |ctx, ()| {
        if all {
            ctx.print("Deleted all images");
        } else {
            ctx.print(format!("Deleted {}", references.join(", ")));
        }
    })
}

fn save(ctx: &Context, reference: &str, output: &str, platform: Option<&str>) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(images::save(runner.as_ref(), reference, output, platform));

    ctx.finish(result, |ctx, ()| {
        ctx.print(format!("Saved {} to {}", reference, output));
    })
}

fn load(ctx: &Context, input: &str) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(images::load(runner.as_ref(), input));

    ctx.finish(result, |ctx, report| {
        if !report.is_empty() {
            ctx.print(report);
        }
        ctx.print(format!("Loaded {}", input));
    })
}

fn prune(ctx: &Context) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(images::prune(runner.as_ref()));

    ctx.finish(result, |ctx, report| {
        if report.is_empty() {
            ctx.print("Nothing to prune.");
        } else {
            ctx.print(report);
        }
    })
}

fn inspect(ctx: &Context, references: Vec<String>) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(images::inspect(runner.as_ref(), &references));

    ctx.finish(result, |ctx, value| {
        match serde_json::to_string_pretty(value) {
            Ok(text) => ctx.print(text),
            Err(_) => ctx.print(value),
        }
    })
}

fn build(ctx: &Context, req: BuildRequest) -> Result<()> {
    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(images::build(runner.as_ref(), &req));

    ctx.finish(result, |ctx, report| {
        if !report.is_empty() {
            ctx.print(report);
        }
        match &req.tag {
            Some(tag) => ctx.print(format!("Built {}", tag)),
            None => ctx.print("Build complete"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_size_scales_units() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KiB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MiB");
        assert_eq!(human_size(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }
}
