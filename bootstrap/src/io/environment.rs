//! Isolated environment provisioning and activation.
//!
//! Activation never touches process-wide state. [`ActiveEnvironment`] is the
//! resolved installation root, and every command that must run "inside" the
//! environment is built through it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::layout::Layout;
use crate::core::types::Step;
use crate::error::SequenceError;
use crate::io::process::{Stdout, run_tool};

/// Create an environment at `environment_dir` using `runtime -m venv`.
pub fn create_environment(runtime: &Path, environment_dir: &Path, timeout: Duration) -> Result<()> {
    info!(
        runtime = %runtime.display(),
        path = %environment_dir.display(),
        "creating environment"
    );
    let mut cmd = Command::new(runtime);
    cmd.arg("-m").arg("venv").arg(environment_dir);
    run_tool(Step::EnsureEnvironment, "venv", cmd, Stdout::Inherit, timeout)
}

/// An environment whose interpreter has been located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEnvironment {
    pub root: PathBuf,
    pub interpreter: PathBuf,
    /// `PATH` for child processes: the scripts dir, then the inherited entries.
    pub search_path: OsString,
}

impl ActiveEnvironment {
    /// Bind to the environment described by `layout`.
    ///
    /// `inherited_path` is the `PATH` the environment's scripts dir is prepended to.
    pub fn activate(layout: &Layout, inherited_path: Option<OsString>) -> Result<Self> {
        let interpreter = layout.interpreter_path();
        if !interpreter.is_file() {
            return Err(SequenceError::CorruptEnvironment { interpreter }.into());
        }
        let mut entries = vec![layout.scripts_dir()];
        if let Some(path) = &inherited_path {
            entries.extend(std::env::split_paths(path));
        }
        let search_path = std::env::join_paths(entries)
            .context("build PATH for activated environment")?;

        debug!(
            root = %layout.environment_dir.display(),
            interpreter = %interpreter.display(),
            "environment activated"
        );
        Ok(Self {
            root: layout.environment_dir.clone(),
            interpreter,
            search_path,
        })
    }

    /// A command running the environment's interpreter with activation applied.
    pub fn interpreter_command(&self) -> Command {
        let mut cmd = Command::new(&self.interpreter);
        cmd.env("VIRTUAL_ENV", &self.root)
            .env("PATH", &self.search_path)
            .env_remove("PYTHONHOME");
        cmd
    }
}
