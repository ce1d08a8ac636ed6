//! Installation directory layout.
//!
//! Compiler internals (lib, libexec, include) go into a private `gcc`
//! subdirectory of the keg so several GCC versions can be installed side by
//! side. Only `share` and the suffixed binaries live at the keg root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where an install puts its files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallLayout {
    prefix: PathBuf,
}

impl InstallLayout {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        InstallLayout {
            prefix: prefix.into(),
        }
    }

    /// Keg root.
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Sandboxed prefix passed to `--prefix`.
    pub fn gcc_prefix(&self) -> PathBuf {
        self.prefix.join("gcc")
    }

    pub fn share(&self) -> PathBuf {
        self.prefix.join("share")
    }

    pub fn bin(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    /// man7 pages clash with other GCC installs and are removed after install.
    pub fn man7(&self) -> PathBuf {
        self.share().join("man").join("man7")
    }
}
