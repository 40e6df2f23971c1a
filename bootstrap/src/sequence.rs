//! Orchestration of one bootstrap invocation.
//!
//! Steps run strictly in order and stop at the first failure. Nothing is rolled
//! back: every step is idempotent, so the next invocation resumes where this
//! one stopped.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::core::layout::Layout;
use crate::core::target::LaunchTarget;
use crate::core::types::Step;
use crate::io::workdirs::ensure_directories;
use crate::toolchain::Toolchain;

/// Provisioning actions one invocation actually performed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Runtime resolved by this invocation.
    pub runtime: Option<PathBuf>,
    pub environment_created: bool,
    pub dependencies_installed: bool,
    /// Working directories that did not exist before this run.
    pub directories_created: Vec<PathBuf>,
}

/// Result of a sequence that reached the launch step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOutcome {
    pub report: ProvisionReport,
    /// Exit code of the server process.
    pub exit_code: i32,
}

/// Run the full bootstrap sequence in `root` and hand off to the server.
pub fn run_sequence<T: Toolchain>(root: &Path, toolchain: &T) -> Result<SequenceOutcome> {
    let layout = Layout::new(root);
    let target = LaunchTarget::SCHEDULER;
    let mut report = ProvisionReport::default();
    debug!(root = %root.display(), "starting bootstrap sequence");

    let runtime = toolchain.resolve_runtime(&layout)?;
    report.runtime = Some(runtime.path.clone());
    match runtime.version {
        Some(version) => status(
            Step::CheckRuntime,
            format_args!("{} ({version})", runtime.path.display()),
        ),
        None => status(Step::CheckRuntime, runtime.path.display()),
    }

    let env_dir = layout.display_relative(&layout.environment_dir);
    if layout.environment_dir.exists() {
        debug!(path = %layout.environment_dir.display(), "environment present, skipping creation");
        status(Step::EnsureEnvironment, format_args!("reusing {env_dir}"));
    } else {
        status(Step::EnsureEnvironment, format_args!("creating {env_dir}"));
        toolchain.create_environment(&runtime, &layout)?;
        report.environment_created = true;
    }

    let env = toolchain.activate(&layout)?;
    status(Step::ActivateEnvironment, env.interpreter.display());

    status(
        Step::InstallDependencies,
        layout.display_relative(&layout.manifest_path),
    );
    toolchain.install_dependencies(&env, &layout.manifest_path)?;
    report.dependencies_installed = true;

    report.directories_created = ensure_directories(&layout.working_dirs)?;
    let created: Vec<String> = report
        .directories_created
        .iter()
        .map(|dir| layout.display_relative(dir).to_string())
        .collect();
    if created.is_empty() {
        status(Step::EnsureDirectories, "all present");
    } else {
        status(
            Step::EnsureDirectories,
            format_args!("created {}", created.join(", ")),
        );
    }

    if !layout.app_entrypoint.is_file() {
        warn!(
            path = %layout.app_entrypoint.display(),
            app = target.app,
            "application module not found; the server will likely fail to start"
        );
    }
    status(
        Step::Launch,
        format_args!("{} on http://{}", target.app, target.address()),
    );
    info!(
        environment_created = report.environment_created,
        directories_created = report.directories_created.len(),
        "provisioning complete, handing off to server"
    );
    let exit_code = toolchain.launch(&env, &target, &layout.root)?;

    Ok(SequenceOutcome { report, exit_code })
}

fn status(step: Step, detail: impl Display) {
    println!("bootstrap: {step} {detail}");
}
