//! Helpers for running provisioning tools as child processes with timeouts.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::core::types::Step;
use crate::error::SequenceError;
use crate::exit_codes;

/// Captured output of a short-lived probe command.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

impl CommandOutput {
    /// Stdout followed by stderr, lossily decoded.
    pub fn combined_text(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&self.stderr));
        text
    }
}

/// Where a tool's stdout goes. Stderr is always inherited so failures stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stdout {
    Inherit,
    Discard,
}

/// Run a probe command with a timeout and capture stdout/stderr without risking pipe deadlocks.
///
/// Output is read concurrently while the child runs. `output_limit_bytes` bounds the amount of
/// stdout/stderr stored in memory (bytes beyond this are discarded while still draining the pipe).
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), output_limit_bytes))]
pub fn run_command_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    output_limit_bytes: usize,
) -> Result<CommandOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning probe process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || read_stream_limited(stdout, output_limit_bytes));
    let stderr_handle = thread::spawn(move || read_stream_limited(stderr, output_limit_bytes));

    let (status, timed_out) = wait_or_kill(&mut child, timeout)?;

    let stdout = join_output(stdout_handle).context("join stdout")?;
    let stderr = join_output(stderr_handle).context("join stderr")?;

    debug!(exit_code = ?status.code(), timed_out, "probe finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        timed_out,
    })
}

/// Run a provisioning tool in the foreground and require it to succeed.
///
/// Stdin is closed and stderr inherited. A spawn failure, a timeout, or a
/// non-zero exit is reported as the matching [`SequenceError`] for `step`.
#[instrument(skip_all, fields(%step, tool, timeout_secs = timeout.as_secs()))]
pub fn run_tool(
    step: Step,
    tool: &str,
    mut cmd: Command,
    stdout: Stdout,
    timeout: Duration,
) -> Result<()> {
    cmd.stdin(Stdio::null()).stderr(Stdio::inherit());
    match stdout {
        Stdout::Inherit => cmd.stdout(Stdio::inherit()),
        Stdout::Discard => cmd.stdout(Stdio::null()),
    };

    debug!(?cmd, "spawning tool");
    let mut child = cmd.spawn().map_err(|source| {
        error!(err = %source, "failed to spawn tool");
        SequenceError::Spawn {
            step,
            tool: tool.to_string(),
            source,
        }
    })?;

    let (status, timed_out) = wait_or_kill(&mut child, timeout)?;
    if timed_out {
        return Err(SequenceError::TimedOut {
            step,
            tool: tool.to_string(),
            secs: timeout.as_secs(),
        }
        .into());
    }
    if !status.success() {
        let code = exit_code(status);
        warn!(exit_code = code, "tool failed");
        return Err(SequenceError::ToolFailed {
            step,
            tool: tool.to_string(),
            code,
        }
        .into());
    }
    debug!("tool finished");
    Ok(())
}

/// Map a child's exit status to a process exit code.
///
/// Signal terminations become `128 + signal`, as shells report them.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return exit_codes::SIGNAL_BASE + signal;
        }
    }
    exit_codes::FAILURE
}

fn wait_or_kill(child: &mut std::process::Child, timeout: Duration) -> Result<(ExitStatus, bool)> {
    match child.wait_timeout(timeout).context("wait for command")? {
        Some(status) => Ok((status, false)),
        None => {
            warn!(
                timeout_secs = timeout.as_secs(),
                "command timed out, killing"
            );
            child.kill().context("kill command")?;
            let status = child.wait().context("wait command after kill")?;
            Ok((status, true))
        }
    }
}

fn join_output(handle: thread::JoinHandle<Result<Vec<u8>>>) -> Result<Vec<u8>> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            buf.extend_from_slice(&chunk[..n.min(remaining)]);
        }
    }

    Ok(buf)
}
