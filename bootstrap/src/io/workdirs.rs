//! Working directories the server expects next to the invocation root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::core::types::Step;
use crate::error::SequenceError;

/// Create each directory in `dirs` that does not exist yet.
///
/// Existing directories and their contents are left alone. Returns the
/// directories that were actually created, in input order.
pub fn ensure_directories(dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    for dir in dirs {
        if dir.is_dir() {
            debug!(path = %dir.display(), "directory present");
            continue;
        }
        create_dir(dir)?;
        debug!(path = %dir.display(), "directory created");
        created.push(dir.clone());
    }
    Ok(created)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| {
        SequenceError::Filesystem {
            step: Step::EnsureDirectories,
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}
