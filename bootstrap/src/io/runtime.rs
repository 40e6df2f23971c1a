//! Resolution of the language runtime on `PATH`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::core::version::RuntimeVersion;
use crate::error::SequenceError;
use crate::io::process::run_command_with_timeout;

const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(30);
const VERSION_PROBE_LIMIT_BYTES: usize = 4096;

/// A runtime interpreter found on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runtime {
    pub path: PathBuf,
    /// `None` when the interpreter's version banner could not be parsed.
    pub version: Option<RuntimeVersion>,
}

/// Find the first of `candidates` on the search path.
///
/// `search_path` overrides `PATH` when set. Candidates containing a path
/// separator are resolved against `root`.
pub fn find_runtime(
    candidates: &[String],
    search_path: Option<&OsString>,
    root: &Path,
) -> Option<PathBuf> {
    let paths = search_path.cloned().or_else(|| std::env::var_os("PATH"));
    candidates
        .iter()
        .find_map(|name| match which::which_in(name, paths.as_ref(), root) {
            Ok(path) => {
                debug!(candidate = %name, path = %path.display(), "runtime candidate resolved");
                Some(path)
            }
            Err(err) => {
                debug!(candidate = %name, err = %err, "runtime candidate not found");
                None
            }
        })
}

/// Ask an interpreter for its version via `--version`.
pub fn probe_version(interpreter: &Path) -> Option<RuntimeVersion> {
    let mut cmd = Command::new(interpreter);
    cmd.arg("--version");
    let probe = run_command_with_timeout(cmd, VERSION_PROBE_TIMEOUT, VERSION_PROBE_LIMIT_BYTES);
    let output = match probe {
        Ok(output) => output,
        Err(err) => {
            warn!(path = %interpreter.display(), err = %err, "runtime version probe failed");
            return None;
        }
    };
    if output.timed_out || !output.status.success() {
        warn!(
            path = %interpreter.display(),
            exit_code = ?output.status.code(),
            timed_out = output.timed_out,
            "runtime version probe failed"
        );
        return None;
    }
    // Interpreters before 3.4 print the banner on stderr.
    RuntimeVersion::from_version_output(&output.combined_text())
}

/// Resolve the runtime and enforce the minimum version.
///
/// An unparseable version banner is tolerated with a warning.
pub fn resolve_runtime(
    candidates: &[String],
    minimum: RuntimeVersion,
    search_path: Option<&OsString>,
    root: &Path,
) -> Result<Runtime> {
    let path = find_runtime(candidates, search_path, root).ok_or_else(|| SequenceError::MissingRuntime {
        tried: candidates.to_vec(),
        minimum,
    })?;

    let version = probe_version(&path);
    match version {
        Some(found) if !found.satisfies(&minimum) => {
            return Err(SequenceError::UnsupportedRuntime {
                path,
                found,
                minimum,
            }
            .into());
        }
        Some(found) => info!(path = %path.display(), version = %found, "runtime resolved"),
        None => warn!(
            path = %path.display(),
            %minimum,
            "could not determine runtime version; continuing"
        ),
    }
    Ok(Runtime { path, version })
}
