//! The GCC recipe: where the source lives and what it needs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::dependency::Dependency;
use crate::core::options::{BuildOption, OptionSet};
use crate::core::version::Version;

/// Digest algorithm used to verify a source archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumKind {
    Sha1,
    Sha256,
}

impl ChecksumKind {
    fn hex_len(&self) -> usize {
        match self {
            ChecksumKind::Sha1 => 40,
            ChecksumKind::Sha256 => 64,
        }
    }
}

/// An expected archive digest, written as `sha1:<hex>` or `sha256:<hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum {
    pub kind: ChecksumKind,
    pub hex: String,
}

#[derive(Debug, Clone, Error)]
#[error("invalid checksum `{0}`, expected `sha1:<hex>` or `sha256:<hex>`")]
pub struct ChecksumParseError(pub String);

impl FromStr for Checksum {
    type Err = ChecksumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, hex) = s
            .split_once(':')
            .ok_or_else(|| ChecksumParseError(s.to_string()))?;
        let kind = match kind {
            "sha1" => ChecksumKind::Sha1,
            "sha256" => ChecksumKind::Sha256,
            _ => return Err(ChecksumParseError(s.to_string())),
        };
        let hex = hex.to_ascii_lowercase();
        if hex.len() != kind.hex_len() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ChecksumParseError(s.to_string()));
        }
        Ok(Checksum { kind, hex })
    }
}

impl TryFrom<String> for Checksum {
    type Error = ChecksumParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Checksum> for String {
    fn from(value: Checksum) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ChecksumKind::Sha1 => "sha1",
            ChecksumKind::Sha256 => "sha256",
        };
        write!(f, "{}:{}", kind, self.hex)
    }
}

/// Declarative description of the compiler package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub version: Version,
    pub homepage: String,
    /// Release tarball URL.
    pub url: String,
    pub checksum: Checksum,
    /// Development branch; recorded but not buildable by this tool.
    pub head: Option<String>,
}

impl Recipe {
    /// The built-in GCC 4.8.0 recipe.
    pub fn gcc48() -> Self {
        Recipe {
            name: "gcc48".to_string(),
            version: Version::parse("4.8.0").expect("valid built-in version"),
            homepage: "http://gcc.gnu.org".to_string(),
            url: "ftp://gcc.gnu.org/pub/gcc/releases/gcc-4.8.0/gcc-4.8.0.tar.bz2".to_string(),
            checksum: Checksum {
                kind: ChecksumKind::Sha1,
                hex: "b4ee6e9bdebc65223f95067d0cc1a634b59dad72".to_string(),
            },
            head: Some("svn://gcc.gnu.org/svn/gcc/branches/gcc-4_8-branch".to_string()),
        }
    }

    /// Options this recipe understands.
    pub fn options(&self) -> &'static [BuildOption] {
        &BuildOption::ALL
    }

    /// Dependencies needed for the given options.
    ///
    /// The five libraries are always needed; ecj only when Java is built.
    pub fn required_dependencies(&self, options: &OptionSet) -> Vec<Dependency> {
        let mut deps = Dependency::LIBRARIES.to_vec();
        if options.wants_java() {
            deps.push(Dependency::Ecj);
        }
        deps
    }

    /// File name of the release archive, taken from the URL.
    pub fn archive_name(&self) -> String {
        self.url
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}-{}.tar.bz2", self.name, self.version))
    }
}

impl Default for Recipe {
    fn default() -> Self {
        Recipe::gcc48()
    }
}
