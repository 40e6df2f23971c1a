//! Fixed filesystem layout relative to the invocation root.
//!
//! Every path the sequence touches is derived here. None of them are
//! configurable: the surrounding project expects exactly this layout.

use std::path::{Path, PathBuf};

/// Isolated environment directory.
pub const ENVIRONMENT_DIR: &str = "venv";
/// Dependency manifest consumed by the installer.
pub const MANIFEST_FILE: &str = "requirements.txt";
/// Working directories the server expects to exist before it starts.
pub const WORKING_DIRS: [&str; 3] = ["data", "logs", "scripts"];
/// Source file backing the `app.main` module.
pub const APP_ENTRYPOINT: &str = "app/main.py";

/// Host platform flavor, as far as environment layout is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Directory inside the environment holding its executables.
    pub fn scripts_dir_name(self) -> &'static str {
        match self {
            Platform::Unix => "bin",
            Platform::Windows => "Scripts",
        }
    }

    pub fn interpreter_name(self) -> &'static str {
        match self {
            Platform::Unix => "python",
            Platform::Windows => "python.exe",
        }
    }

    /// Runtime executables to look for on `PATH`, most preferred first.
    pub fn default_runtime_candidates(self) -> &'static [&'static str] {
        match self {
            Platform::Unix => &["python3", "python"],
            Platform::Windows => &["python", "python3"],
        }
    }
}

/// All canonical paths for an invocation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub environment_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub working_dirs: Vec<PathBuf>,
    pub app_entrypoint: PathBuf,
    pub platform: Platform,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::for_platform(root, Platform::current())
    }

    pub fn for_platform(root: impl Into<PathBuf>, platform: Platform) -> Self {
        let root = root.into();
        Self {
            environment_dir: root.join(ENVIRONMENT_DIR),
            manifest_path: root.join(MANIFEST_FILE),
            working_dirs: WORKING_DIRS.iter().map(|name| root.join(name)).collect(),
            app_entrypoint: root.join(APP_ENTRYPOINT),
            platform,
            root,
        }
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.environment_dir.join(self.platform.scripts_dir_name())
    }

    pub fn interpreter_path(&self) -> PathBuf {
        self.scripts_dir().join(self.platform.interpreter_name())
    }

    /// Render `path` relative to the root for status lines.
    pub fn display_relative<'a>(&self, path: &'a Path) -> std::path::Display<'a> {
        path.strip_prefix(&self.root).unwrap_or(path).display()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_layout_uses_bin_dir() {
        let layout = Layout::for_platform("/work", Platform::Unix);
        assert_eq!(layout.environment_dir, PathBuf::from("/work/venv"));
        assert_eq!(layout.manifest_path, PathBuf::from("/work/requirements.txt"));
        assert_eq!(
            layout.interpreter_path(),
            PathBuf::from("/work/venv/bin/python")
        );
    }

    #[test]
    fn windows_layout_uses_scripts_dir() {
        let layout = Layout::for_platform("/work", Platform::Windows);
        assert_eq!(
            layout.interpreter_path(),
            PathBuf::from("/work/venv/Scripts/python.exe")
        );
    }

    #[test]
    fn working_dirs_are_data_logs_scripts() {
        let layout = Layout::for_platform("/work", Platform::Unix);
        let names: Vec<String> = layout
            .working_dirs
            .iter()
            .map(|path| layout.display_relative(path).to_string())
            .collect();
        assert_eq!(names, vec!["data", "logs", "scripts"]);
    }
}
