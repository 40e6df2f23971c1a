//! Dependency installation into an active environment.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::core::types::Step;
use crate::io::environment::ActiveEnvironment;
use crate::io::process::{Stdout, run_tool};

/// Install `manifest` with the environment's own `pip`.
///
/// Runs quietly: progress output is discarded, errors still reach stderr.
/// Already-satisfied requirements make this a no-op on pip's side.
pub fn install_manifest(env: &ActiveEnvironment, manifest: &Path, timeout: Duration) -> Result<()> {
    info!(manifest = %manifest.display(), "installing dependencies");
    let mut cmd = env.interpreter_command();
    cmd.args(["-m", "pip", "install", "-q", "-r"]).arg(manifest);
    run_tool(
        Step::InstallDependencies,
        "pip",
        cmd,
        Stdout::Discard,
        timeout,
    )
}
