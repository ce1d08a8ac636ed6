//! Recipe version handling.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static MAJOR_MINOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)").expect("valid regex"));

/// Error for version strings without a `major.minor` component.
#[derive(Debug, Clone, Error)]
#[error("version `{0}` has no major.minor component")]
pub struct VersionError(pub String);

/// A recipe version such as `4.8.0`.
///
/// Kept as the original string; only the `major.minor` prefix matters for
/// naming installed binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    raw: String,
    major: u32,
    minor: u32,
}

impl Version {
    /// Parse a version string. The first `N.N` match supplies major and minor.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let caps = MAJOR_MINOR
            .captures(raw)
            .ok_or_else(|| VersionError(raw.to_string()))?;
        let major = caps[1]
            .parse()
            .map_err(|_| VersionError(raw.to_string()))?;
        let minor = caps[2]
            .parse()
            .map_err(|_| VersionError(raw.to_string()))?;

        Ok(Version {
            raw: raw.to_string(),
            major,
            minor,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `major.minor`, e.g. `4.8`.
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// Suffix appended to installed program names, e.g. `-4.8`.
    pub fn program_suffix(&self) -> String {
        format!("-{}", self.major_minor())
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Version::parse(&value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.raw
    }
}

impl std::str::FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
