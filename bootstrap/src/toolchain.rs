//! Toolchain abstraction for the side-effecting steps of the sequence.
//!
//! The [`Toolchain`] trait decouples sequence orchestration from the actual
//! runtime, environment tooling and server. Tests use scripted toolchains that
//! record calls instead of spawning processes.

use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use crate::core::layout::Layout;
use crate::core::target::LaunchTarget;
use crate::io::config::BootstrapConfig;
use crate::io::environment::{ActiveEnvironment, create_environment};
use crate::io::installer::install_manifest;
use crate::io::launcher::{launch, launch_command};
use crate::io::runtime::{Runtime, resolve_runtime};

/// Runtime resolution, environment provisioning, installation and launch.
pub trait Toolchain {
    /// Locate the runtime and check its version.
    fn resolve_runtime(&self, layout: &Layout) -> Result<Runtime>;

    /// Create the isolated environment at `layout.environment_dir`.
    fn create_environment(&self, runtime: &Runtime, layout: &Layout) -> Result<()>;

    /// Bind to an existing environment.
    fn activate(&self, layout: &Layout) -> Result<ActiveEnvironment> {
        ActiveEnvironment::activate(layout, std::env::var_os("PATH"))
    }

    /// Install the dependency manifest into the environment.
    fn install_dependencies(&self, env: &ActiveEnvironment, manifest: &Path) -> Result<()>;

    /// Hand off to the server and return its exit code.
    fn launch(&self, env: &ActiveEnvironment, target: &LaunchTarget, workdir: &Path)
    -> Result<i32>;
}

/// Toolchain backed by the host's runtime, `venv`, `pip` and `uvicorn`.
pub struct SystemToolchain {
    config: BootstrapConfig,
    search_path: Option<OsString>,
}

impl SystemToolchain {
    /// Use the process `PATH` for runtime resolution and activation.
    pub fn new(config: BootstrapConfig) -> Self {
        Self::with_search_path(config, std::env::var_os("PATH"))
    }

    pub fn with_search_path(config: BootstrapConfig, search_path: Option<OsString>) -> Self {
        Self {
            config,
            search_path,
        }
    }
}

impl Toolchain for SystemToolchain {
    fn resolve_runtime(&self, layout: &Layout) -> Result<Runtime> {
        let minimum = self.config.runtime.minimum()?;
        resolve_runtime(
            &self.config.runtime.candidates,
            minimum,
            self.search_path.as_ref(),
            &layout.root,
        )
    }

    fn create_environment(&self, runtime: &Runtime, layout: &Layout) -> Result<()> {
        create_environment(
            &runtime.path,
            &layout.environment_dir,
            Duration::from_secs(self.config.provision_timeout_secs),
        )
    }

    fn activate(&self, layout: &Layout) -> Result<ActiveEnvironment> {
        ActiveEnvironment::activate(layout, self.search_path.clone())
    }

    fn install_dependencies(&self, env: &ActiveEnvironment, manifest: &Path) -> Result<()> {
        install_manifest(
            env,
            manifest,
            Duration::from_secs(self.config.install_timeout_secs),
        )
    }

    fn launch(
        &self,
        env: &ActiveEnvironment,
        target: &LaunchTarget,
        workdir: &Path,
    ) -> Result<i32> {
        launch(launch_command(env, target, workdir), self.config.launch)
    }
}
