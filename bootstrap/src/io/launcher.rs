//! Handoff to the server process.
//!
//! With `exec` the bootstrap process becomes the server, so the exit code is
//! the server's by construction. With `spawn` the server runs as a child and
//! every interrupt this process receives is forwarded to it. The bootstrap
//! keeps waiting and exits with the child's code.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::core::target::{ASGI_RUNNER, LaunchTarget};
use crate::core::types::Step;
use crate::error::SequenceError;
use crate::io::config::LaunchMode;
use crate::io::environment::ActiveEnvironment;
use crate::io::process::exit_code;

/// The server command for `target`, run by the environment's interpreter from `workdir`.
pub fn launch_command(env: &ActiveEnvironment, target: &LaunchTarget, workdir: &Path) -> Command {
    let mut cmd = env.interpreter_command();
    cmd.args(target.interpreter_args()).current_dir(workdir);
    cmd
}

/// Hand off to `cmd` and return the server's exit code.
///
/// In `exec` mode this only returns if the replacement itself failed.
pub fn launch(cmd: Command, mode: LaunchMode) -> Result<i32> {
    match mode.resolve() {
        LaunchMode::Exec => exec_replace(cmd),
        LaunchMode::Auto | LaunchMode::Spawn => spawn_and_wait(cmd),
    }
}

#[cfg(unix)]
fn exec_replace(mut cmd: Command) -> Result<i32> {
    use std::os::unix::process::CommandExt;

    info!(program = ?cmd.get_program(), "replacing bootstrap process with server");
    let source = cmd.exec();
    Err(spawn_error(source))
}

#[cfg(not(unix))]
fn exec_replace(_cmd: Command) -> Result<i32> {
    Err(anyhow::anyhow!(
        "process replacement is only supported on Unix (set launch = \"spawn\")"
    ))
}

fn spawn_and_wait(mut cmd: Command) -> Result<i32> {
    // Terminal interrupts reach only the bootstrap; the server gets exactly one copy.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build launch runtime")?;
    runtime.block_on(wait_for_server(cmd))
}

async fn wait_for_server(cmd: Command) -> Result<i32> {
    let mut child = tokio::process::Command::from(cmd)
        .spawn()
        .map_err(spawn_error)?;
    info!(pid = ?child.id(), "server started");

    loop {
        tokio::select! {
            status = child.wait() => {
                let code = exit_code(status.context("wait for server")?);
                info!(exit_code = code, "server exited");
                return Ok(code);
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("listen for interrupt")?;
                debug!("interrupt received, forwarding to server");
                if let Err(err) = forward_interrupt(&child) {
                    warn!(err = %format!("{err:#}"), "could not forward interrupt to server");
                }
            }
        }
    }
}

#[cfg(unix)]
fn forward_interrupt(child: &tokio::process::Child) -> Result<()> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    // Already reaped.
    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pid = i32::try_from(pid).context("server pid out of range")?;
    kill(Pid::from_raw(pid), Signal::SIGINT).context("send SIGINT to server")
}

#[cfg(not(unix))]
fn forward_interrupt(_child: &tokio::process::Child) -> Result<()> {
    // Console control events are delivered to every attached process.
    Ok(())
}

fn spawn_error(source: std::io::Error) -> anyhow::Error {
    SequenceError::Spawn {
        step: Step::Launch,
        tool: ASGI_RUNNER.to_string(),
        source,
    }
    .into()
}
