//! cli::commands::registry
//!
//! Registry session handlers.
//!
//! # Invariants
//!
//! The password never appears in an argument list or the environment: it
//! travels to the runtime over stdin behind `--password-stdin`, and it is
//! only persisted when `--save` is given, through the secret store.

use std::io::Read;

use anyhow::{bail, Context as _, Result};

use crate::cli::args::{RegistryCommand, RegistryDefaultCommand};
use crate::ops::{self, OpsError};
use crate::runtime::{ArgBuilder, ExecOptions, Runner};
use crate::secrets::{self, registry_password_key, registry_username_key, SecretStore};
use crate::ui::prompts;

use super::Context;

pub fn dispatch(command: RegistryCommand, ctx: &Context) -> Result<()> {
    match command {
        RegistryCommand::Login {
            server,
            username,
            password_stdin,
            scheme,
            save,
        } => login(ctx, &server, username, password_stdin, scheme, save),
        RegistryCommand::Logout { server } => logout(ctx, &server),
        RegistryCommand::Default(cmd) => match cmd {
            RegistryDefaultCommand::Set { host, scheme } => default_set(ctx, &host, scheme),
            RegistryDefaultCommand::Unset => default_unset(ctx),
            RegistryDefaultCommand::Inspect => default_inspect(ctx),
        },
    }
}

fn login(
    ctx: &Context,
    server: &str,
    username: Option<String>,
    password_stdin: bool,
    scheme: Option<String>,
    save: bool,
) -> Result<()> {
    let store = secrets::create_store(ctx.config.secrets_provider())?;

    let username = username.or_else(|| store.get(&registry_username_key(server)).ok().flatten());
    let password = resolve_password(ctx, server, password_stdin, store.as_ref())?;

    let args = ArgBuilder::new(["registry", "login"])
        .opt("username", username.as_deref())
        .flag("password-stdin", true)
        .opt("scheme", scheme)
        .arg(server)
        .build();
    let runner = ctx.runner();
    let opts = ExecOptions {
        stdin: Some(password.clone()),
        ..ExecOptions::with_timeout(runner.timeouts().default)
    };
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(run_text(runner.as_ref(), args, &opts));

    if save && result.is_ok() {
        store
            .set(&registry_password_key(server), &password)
            .context("cannot save registry password")?;
        if let Some(user) = &username {
            store
                .set(&registry_username_key(server), user)
                .context("cannot save registry username")?;
        }
        ctx.debug(format!("saved credentials for {}", server));
    }

    ctx.finish(result, |ctx, _report| {
        ctx.print(format!("Logged in to {}", server));
    })
}

/// Password source order: `--password-stdin`, then the secret store, then
/// a hidden prompt.
fn resolve_password(
    ctx: &Context,
    server: &str,
    password_stdin: bool,
    store: &dyn SecretStore,
) -> Result<String> {
    if password_stdin {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("cannot read password from stdin")?;
        let password = buffer.trim_end_matches(['\r', '\n']).to_string();
        if password.is_empty() {
            bail!("empty password on stdin");
        }
        return Ok(password);
    }

    if let Some(stored) = store.get(&registry_password_key(server))? {
        ctx.debug(format!("using stored credentials for {}", server));
        return Ok(stored);
    }

    if !ctx.interactive {
        bail!(
            "no stored credentials for {}; pass --password-stdin or run interactively",
            server
        );
    }
    Ok(prompts::password(&format!("Password for {}", server), ctx.interactive)?)
}

fn logout(ctx: &Context, server: &str) -> Result<()> {
    let args = ArgBuilder::new(["registry", "logout"]).arg(server).build();

    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let opts = ExecOptions::with_timeout(runner.timeouts().default);
    let result = rt.block_on(run_text(runner.as_ref(), args, &opts));

    // Forget stored credentials regardless of what the runtime said; the
    // user asked to log out.
    let store = secrets::create_store(ctx.config.secrets_provider())?;
    store.delete(&registry_password_key(server))?;
    store.delete(&registry_username_key(server))?;

    ctx.finish(result, |ctx, _report| {
        ctx.print(format!("Logged out of {}", server));
    })
}

fn default_set(ctx: &Context, host: &str, scheme: Option<String>) -> Result<()> {
    let args = ArgBuilder::new(["registry", "default", "set"])
        .opt("scheme", scheme)
        .arg(host)
        .build();

    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let opts = ExecOptions::with_timeout(runner.timeouts().default);
    let result = rt.block_on(run_text(runner.as_ref(), args, &opts));

    ctx.finish(result, |ctx, _report| {
        ctx.print(format!("Default registry set to {}", host));
    })
}

fn default_unset(ctx: &Context) -> Result<()> {
    let args = ArgBuilder::new(["registry", "default", "unset"]).build();

    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let opts = ExecOptions::with_timeout(runner.timeouts().default);
    let result = rt.block_on(run_text(runner.as_ref(), args, &opts));

    ctx.finish(result, |ctx, _report| {
        ctx.print("Default registry unset");
    })
}

fn default_inspect(ctx: &Context) -> Result<()> {
    let args = ArgBuilder::new(["registry", "default", "inspect"]).build();

    let runner = ctx.runner();
    let rt = tokio::runtime::Runtime::new()?;
    let opts = ExecOptions::with_timeout(runner.timeouts().default);
    let result = rt.block_on(run_text(runner.as_ref(), args, &opts));

    ctx.finish(result, |ctx, report| {
        ctx.print(report);
    })
}

async fn run_text(
    runner: &dyn Runner,
    args: Vec<String>,
    opts: &ExecOptions,
) -> Result<String, OpsError> {
    let output = ops::run(runner, args, opts).await?;
    Ok(output.stdout.trim().to_string())
}
