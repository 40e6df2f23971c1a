//! Bootstrap configuration read from `bootstrap.toml` in the invocation root.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::core::layout::Platform;
use crate::core::version::RuntimeVersion;

/// File name looked up in the invocation root.
pub const CONFIG_FILE: &str = "bootstrap.toml";

/// Bootstrap configuration (TOML).
///
/// Every field is optional. Layout, host and port are not part of it: those
/// are fixed for the scheduler service.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Kill environment creation after this many seconds.
    pub provision_timeout_secs: u64,

    /// Kill dependency installation after this many seconds.
    pub install_timeout_secs: u64,

    pub launch: LaunchMode,

    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Executables tried on `PATH`, most preferred first.
    pub candidates: Vec<String>,

    /// Oldest runtime version the scheduler supports (`MAJOR.MINOR[.PATCH]`).
    pub minimum_version: String,
}

/// How the final step hands off to the server.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    /// `exec` on Unix, `spawn` elsewhere.
    #[default]
    Auto,
    /// Replace the bootstrap process with the server (Unix only).
    Exec,
    /// Spawn the server and wait for it, forwarding operator interrupts.
    Spawn,
}

impl LaunchMode {
    /// Resolve `Auto` for the current platform.
    pub fn resolve(self) -> LaunchMode {
        match self {
            LaunchMode::Auto if cfg!(unix) => LaunchMode::Exec,
            LaunchMode::Auto => LaunchMode::Spawn,
            other => other,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            candidates: Platform::current()
                .default_runtime_candidates()
                .iter()
                .map(|name| name.to_string())
                .collect(),
            minimum_version: "3.8".to_string(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            provision_timeout_secs: 10 * 60,
            install_timeout_secs: 30 * 60,
            launch: LaunchMode::Auto,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn minimum(&self) -> Result<RuntimeVersion> {
        self.minimum_version
            .parse()
            .context("runtime.minimum_version")
    }
}

impl BootstrapConfig {
    pub fn validate(&self) -> Result<()> {
        if self.provision_timeout_secs == 0 {
            return Err(anyhow!("provision_timeout_secs must be > 0"));
        }
        if self.install_timeout_secs == 0 {
            return Err(anyhow!("install_timeout_secs must be > 0"));
        }
        if self.runtime.candidates.is_empty()
            || self.runtime.candidates.iter().any(|c| c.trim().is_empty())
        {
            return Err(anyhow!(
                "runtime.candidates must be a non-empty array of executable names"
            ));
        }
        self.runtime.minimum()?;
        if self.launch == LaunchMode::Exec && !cfg!(unix) {
            return Err(anyhow!("launch = \"exec\" is only supported on Unix"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `BootstrapConfig::default()`.
pub fn load_config(path: &Path) -> Result<BootstrapConfig> {
    if !path.exists() {
        let cfg = BootstrapConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BootstrapConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join(CONFIG_FILE)).expect("load");
        assert_eq!(cfg, BootstrapConfig::default());
        assert_eq!(
            cfg.runtime.minimum().expect("minimum"),
            RuntimeVersion::new(3, 8, 0)
        );
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "install_timeout_secs = 60\nlaunch = \"spawn\"\n\n[runtime]\nminimum_version = \"3.10\"\n",
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.install_timeout_secs, 60);
        assert_eq!(cfg.launch, LaunchMode::Spawn);
        assert_eq!(cfg.provision_timeout_secs, 600);
        assert_eq!(cfg.runtime.candidates, RuntimeConfig::default().candidates);
        assert_eq!(
            cfg.runtime.minimum().expect("minimum"),
            RuntimeVersion::new(3, 10, 0)
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "provision_timeout_secs = 0\n").expect("write");

        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("provision_timeout_secs must be > 0"));
    }

    #[test]
    fn blank_candidate_is_rejected() {
        let cfg = BootstrapConfig {
            runtime: RuntimeConfig {
                candidates: vec!["python3".to_string(), " ".to_string()],
                ..RuntimeConfig::default()
            },
            ..BootstrapConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_minimum_version_is_rejected() {
        let cfg = BootstrapConfig {
            runtime: RuntimeConfig {
                minimum_version: "three".to_string(),
                ..RuntimeConfig::default()
            },
            ..BootstrapConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err:#}").contains("runtime.minimum_version"));
    }

    #[test]
    fn auto_launch_resolves_per_platform() {
        let resolved = LaunchMode::Auto.resolve();
        if cfg!(unix) {
            assert_eq!(resolved, LaunchMode::Exec);
        } else {
            assert_eq!(resolved, LaunchMode::Spawn);
        }
        assert_eq!(LaunchMode::Spawn.resolve(), LaunchMode::Spawn);
    }
}
