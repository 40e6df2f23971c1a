//! Test-only helpers: a scripted toolchain and a throwaway invocation root.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::layout::Layout;
use crate::core::target::LaunchTarget;
use crate::core::types::Step;
use crate::core::version::RuntimeVersion;
use crate::error::SequenceError;
use crate::io::environment::ActiveEnvironment;
use crate::io::runtime::Runtime;
use crate::toolchain::Toolchain;

/// One call recorded by [`ScriptedToolchain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    ResolveRuntime,
    CreateEnvironment,
    InstallDependencies { manifest: PathBuf },
    Launch { args: Vec<String>, workdir: PathBuf },
}

/// How the scripted `venv` step behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateBehavior {
    /// Lay out a complete environment (scripts dir + interpreter).
    Succeed,
    /// Fail with the given tool status before touching the filesystem.
    Fail(i32),
    /// Create the environment dir, then fail without writing an interpreter.
    FailLeavingDir(i32),
}

/// Toolchain double that records calls and fakes their filesystem effects.
pub struct ScriptedToolchain {
    runtime_present: bool,
    create: CreateBehavior,
    install_failure: Option<i32>,
    launch_exit: i32,
    calls: RefCell<Vec<ToolCall>>,
}

impl Default for ScriptedToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedToolchain {
    /// Runtime present, every step succeeds, server exits with 0.
    pub fn new() -> Self {
        Self {
            runtime_present: true,
            create: CreateBehavior::Succeed,
            install_failure: None,
            launch_exit: 0,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn without_runtime(mut self) -> Self {
        self.runtime_present = false;
        self
    }

    pub fn with_create(mut self, behavior: CreateBehavior) -> Self {
        self.create = behavior;
        self
    }

    pub fn failing_install(mut self, code: i32) -> Self {
        self.install_failure = Some(code);
        self
    }

    pub fn with_launch_exit(mut self, code: i32) -> Self {
        self.launch_exit = code;
        self
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.borrow().clone()
    }

    /// Number of recorded calls that changed provisioning state.
    pub fn provisioning_actions(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    ToolCall::CreateEnvironment | ToolCall::InstallDependencies { .. }
                )
            })
            .count()
    }

    fn record(&self, call: ToolCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Toolchain for ScriptedToolchain {
    fn resolve_runtime(&self, _layout: &Layout) -> Result<Runtime> {
        self.record(ToolCall::ResolveRuntime);
        let minimum = RuntimeVersion::new(3, 8, 0);
        if !self.runtime_present {
            return Err(SequenceError::MissingRuntime {
                tried: vec!["python3".to_string(), "python".to_string()],
                minimum,
            }
            .into());
        }
        Ok(Runtime {
            path: PathBuf::from("/usr/bin/python3"),
            version: Some(RuntimeVersion::new(3, 12, 1)),
        })
    }

    fn create_environment(&self, _runtime: &Runtime, layout: &Layout) -> Result<()> {
        self.record(ToolCall::CreateEnvironment);
        let code = match self.create {
            CreateBehavior::Succeed => {
                fs::create_dir_all(layout.scripts_dir()).context("create scripts dir")?;
                fs::write(layout.interpreter_path(), "").context("write interpreter")?;
                return Ok(());
            }
            CreateBehavior::Fail(code) => code,
            CreateBehavior::FailLeavingDir(code) => {
                fs::create_dir_all(&layout.environment_dir).context("create environment dir")?;
                code
            }
        };
        Err(SequenceError::ToolFailed {
            step: Step::EnsureEnvironment,
            tool: "venv".to_string(),
            code,
        }
        .into())
    }

    fn install_dependencies(&self, _env: &ActiveEnvironment, manifest: &Path) -> Result<()> {
        self.record(ToolCall::InstallDependencies {
            manifest: manifest.to_path_buf(),
        });
        match self.install_failure {
            Some(code) => Err(SequenceError::ToolFailed {
                step: Step::InstallDependencies,
                tool: "pip".to_string(),
                code,
            }
            .into()),
            None => Ok(()),
        }
    }

    fn launch(
        &self,
        _env: &ActiveEnvironment,
        target: &LaunchTarget,
        workdir: &Path,
    ) -> Result<i32> {
        self.record(ToolCall::Launch {
            args: target.interpreter_args(),
            workdir: workdir.to_path_buf(),
        });
        Ok(self.launch_exit)
    }
}

/// Temporary invocation root with a dependency manifest in place.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create tempdir")?;
        fs::write(dir.path().join("requirements.txt"), "fastapi\nuvicorn\n")
            .context("write requirements.txt")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.path())
    }

    /// Names of entries directly under the root, sorted.
    pub fn entries(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.path()).context("read workspace")? {
            let entry = entry.context("read entry")?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}
