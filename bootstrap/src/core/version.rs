//! Runtime version parsing and comparison.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use regex::Regex;

/// Display name of the required runtime.
pub const RUNTIME_NAME: &str = "Python";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("valid version regex"));

/// `major.minor[.patch]` version of a language runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl RuntimeVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the first version number from `--version` output such as
    /// `Python 3.11.4`.
    ///
    /// Returns `None` when the output holds no recognizable version.
    pub fn from_version_output(output: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(output)?;
        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = caps.get(2)?.as_str().parse().ok()?;
        let patch = match caps.get(3) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        Some(Self::new(major, minor, patch))
    }

    pub fn satisfies(&self, minimum: &RuntimeVersion) -> bool {
        self >= minimum
    }
}

impl FromStr for RuntimeVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        VERSION_RE
            .find(trimmed)
            .filter(|m| m.start() == 0 && m.end() == trimmed.len())
            .and_then(|_| Self::from_version_output(trimmed))
            .ok_or_else(|| anyhow!("invalid version '{trimmed}' (expected MAJOR.MINOR[.PATCH])"))
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_python_version_banner() {
        let version = RuntimeVersion::from_version_output("Python 3.11.4\n").expect("version");
        assert_eq!(version, RuntimeVersion::new(3, 11, 4));
    }

    #[test]
    fn parses_release_candidate_banner() {
        let version = RuntimeVersion::from_version_output("Python 3.13.0rc2").expect("version");
        assert_eq!(version, RuntimeVersion::new(3, 13, 0));
    }

    #[test]
    fn unrecognized_output_is_none() {
        assert_eq!(RuntimeVersion::from_version_output("Python"), None);
        assert_eq!(RuntimeVersion::from_version_output(""), None);
    }

    #[test]
    fn ordering_is_numeric_not_lexical() {
        let minimum: RuntimeVersion = "3.8".parse().expect("minimum");
        assert!(RuntimeVersion::new(3, 10, 0).satisfies(&minimum));
        assert!(RuntimeVersion::new(3, 8, 0).satisfies(&minimum));
        assert!(!RuntimeVersion::new(3, 7, 17).satisfies(&minimum));
        assert!(!RuntimeVersion::new(2, 7, 18).satisfies(&minimum));
    }

    #[test]
    fn from_str_rejects_surrounding_text() {
        assert!("3.8".parse::<RuntimeVersion>().is_ok());
        assert!(" 3.8.1 ".parse::<RuntimeVersion>().is_ok());
        assert!("python 3.8".parse::<RuntimeVersion>().is_err());
        assert!("3".parse::<RuntimeVersion>().is_err());
    }

    #[test]
    fn display_omits_zero_patch() {
        assert_eq!(RuntimeVersion::new(3, 8, 0).to_string(), "3.8");
        assert_eq!(RuntimeVersion::new(3, 12, 1).to_string(), "3.12.1");
    }
}
