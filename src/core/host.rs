//! Host environment probes.
//!
//! The argument builder needs three facts about the machine it runs on:
//! whether 64-bit code should be forced, whether a full command-line tools
//! install provides `/usr/include`, and where the SDK lives otherwise.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::util::process::{find_executable, ProcessBuilder};

/// Facts about the build host.
pub trait HostProbe {
    /// Whether the host prefers 64-bit code generation.
    fn prefers_64_bit(&self) -> bool;

    /// Whether system headers are installed under `/usr/include`.
    fn has_command_line_tools(&self) -> bool;

    /// SDK root to use as sysroot when command-line tools are missing.
    fn sdk_path(&self) -> Option<PathBuf>;
}

impl<H: HostProbe + ?Sized> HostProbe for &H {
    fn prefers_64_bit(&self) -> bool {
        (**self).prefers_64_bit()
    }

    fn has_command_line_tools(&self) -> bool {
        (**self).has_command_line_tools()
    }

    fn sdk_path(&self) -> Option<PathBuf> {
        (**self).sdk_path()
    }
}

/// Probe that inspects the running system.
#[derive(Debug, Clone, Default)]
pub struct SystemHost {
    /// SDK path from configuration, used instead of asking `xcrun`.
    sdk_override: Option<PathBuf>,
}

/// Location of the standalone command-line tools on macOS.
const CLT_CLANG: &str = "/Library/Developer/CommandLineTools/usr/bin/clang";

impl SystemHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sdk_path(mut self, path: Option<PathBuf>) -> Self {
        self.sdk_override = path;
        self
    }

    fn xcrun_sdk_path() -> Option<PathBuf> {
        let xcrun = find_executable("xcrun")?;
        let output = ProcessBuilder::new(xcrun)
            .arg("--show-sdk-path")
            .exec()
            .ok()?;
        if !output.status.success() {
            tracing::debug!("xcrun --show-sdk-path failed");
            return None;
        }
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }
}

impl HostProbe for SystemHost {
    fn prefers_64_bit(&self) -> bool {
        cfg!(target_pointer_width = "64")
    }

    fn has_command_line_tools(&self) -> bool {
        if cfg!(target_os = "macos") {
            Path::new(CLT_CLANG).exists() || Path::new("/usr/include").is_dir()
        } else {
            true
        }
    }

    fn sdk_path(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.sdk_override {
            return Some(path.clone());
        }
        if cfg!(target_os = "macos") {
            Self::xcrun_sdk_path()
        } else {
            None
        }
    }
}

/// Probe with fixed answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticHost {
    pub prefers_64_bit: bool,
    pub command_line_tools: bool,
    pub sdk_path: Option<PathBuf>,
}

impl StaticHost {
    /// Snapshot another probe.
    pub fn capture(probe: &dyn HostProbe) -> Self {
        StaticHost {
            prefers_64_bit: probe.prefers_64_bit(),
            command_line_tools: probe.has_command_line_tools(),
            sdk_path: probe.sdk_path(),
        }
    }
}

impl Default for StaticHost {
    fn default() -> Self {
        StaticHost {
            prefers_64_bit: true,
            command_line_tools: true,
            sdk_path: None,
        }
    }
}

impl HostProbe for StaticHost {
    fn prefers_64_bit(&self) -> bool {
        self.prefers_64_bit
    }

    fn has_command_line_tools(&self) -> bool {
        self.command_line_tools
    }

    fn sdk_path(&self) -> Option<PathBuf> {
        self.sdk_path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_static_host() {
        let host = StaticHost {
            prefers_64_bit: false,
            command_line_tools: false,
            sdk_path: Some(PathBuf::from("/sdk")),
        };
        assert_eq!(StaticHost::capture(&host), host);
    }

    #[test]
    fn test_sdk_override_wins() {
        let host = SystemHost::new().with_sdk_path(Some(PathBuf::from("/custom/sdk")));
        assert_eq!(host.sdk_path(), Some(PathBuf::from("/custom/sdk")));
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_non_macos_hosts_have_system_headers() {
        assert!(SystemHost::new().has_command_line_tools());
    }
}
