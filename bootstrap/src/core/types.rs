//! Shared deterministic types for the bootstrap sequence.
//!
//! These types name the steps of the sequence and must stay stable: step labels
//! appear in status lines and in error messages.

use std::fmt;

/// One step of the bootstrap sequence, listed in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// Resolve the language runtime on `PATH` and check its version.
    CheckRuntime,
    /// Create the isolated environment if its directory is absent.
    EnsureEnvironment,
    /// Bind later steps to the environment's interpreter.
    ActivateEnvironment,
    /// Install the dependency manifest into the environment.
    InstallDependencies,
    /// Create the working directories if missing.
    EnsureDirectories,
    /// Hand off to the server process.
    Launch,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::CheckRuntime,
        Step::EnsureEnvironment,
        Step::ActivateEnvironment,
        Step::InstallDependencies,
        Step::EnsureDirectories,
        Step::Launch,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Step::CheckRuntime => "check-runtime",
            Step::EnsureEnvironment => "ensure-environment",
            Step::ActivateEnvironment => "activate-environment",
            Step::InstallDependencies => "install-dependencies",
            Step::EnsureDirectories => "ensure-directories",
            Step::Launch => "launch",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
