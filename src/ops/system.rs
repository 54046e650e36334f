//! ops::system
//!
//! Runtime service management.
//!
//! # Design
//!
//! The three-valued [`SystemStatus`] is derived from how the probe fails:
//! a binary that cannot be spawned means the runtime was never installed
//! or registered; a probe that runs but exits non-zero means the services
//! are registered but not answering; a clean exit means running.

use crate::model::SystemStatus;
use crate::runtime::{ArgBuilder, ExecOptions, Runner, RuntimeError};

use super::{run, OpsError};

/// Options for starting the runtime services.
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    /// Path to the API server binary, when not the installed default.
    pub path: Option<String>,
    /// Enable debug logging in the daemon.
    pub debug: bool,
    /// Explicitly enable or disable automatic kernel installation.
    pub kernel_install: Option<bool>,
}

/// Probe the runtime services and classify the result.
pub async fn status(runner: &dyn Runner) -> Result<SystemStatus, OpsError> {
    let args = ArgBuilder::new(["system", "status"]).build();
    let opts = ExecOptions::with_timeout(runner.timeouts().default);
    match runner.execute(&args, &opts).await {
        Ok(output) if output.success => Ok(SystemStatus::Running),
        Ok(_) => Ok(SystemStatus::NotRunning),
        Err(RuntimeError::Spawn { .. }) => Ok(SystemStatus::NotRegistered),
        Err(e) => Err(e.into()),
    }
}

/// Start the runtime services.
pub async fn start(runner: &dyn Runner, opts: &StartOptions) -> Result<String, OpsError> {
    let mut builder = ArgBuilder::new(["system", "start"])
        .opt("path", opts.path.as_ref())
        .flag("debug", opts.debug);
    if let Some(enable) = opts.kernel_install {
        builder = builder.flag(
            if enable {
                "enable-kernel-install"
            } else {
                "disable-kernel-install"
            },
            true,
        );
    }
    let opts = ExecOptions::with_timeout(runner.timeouts().default);
    let output = run(runner, builder.build(), &opts).await?;
    Ok(output.stdout.trim().to_string())
}

/// Stop all runtime services.
pub async fn stop(runner: &dyn Runner, prefix: Option<&str>) -> Result<(), OpsError> {
    let args = ArgBuilder::new(["system", "stop"])
        .opt("prefix", prefix)
        .build();
    run(runner, args, &ExecOptions::with_timeout(runner.timeouts().default)).await?;
    Ok(())
}

/// Whether the runtime CLI answers at all.
pub async fn ping(runner: &dyn Runner) -> bool {
    crate::runtime::probe(runner).await
}
