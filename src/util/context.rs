//! Global context for gccforge operations.
//!
//! Provides centralized access to paths and the merged configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;

use crate::util::config::{load_config, Config};

/// Name of the per-user and per-project data directory.
pub const DATA_DIR_NAME: &str = ".gccforge";

/// Environment variable that overrides the home directory location.
pub const HOME_ENV: &str = "GCCFORGE_HOME";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global data (~/.gccforge/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = std::env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .or_else(|| BaseDirs::new().map(|b| b.home_dir().join(DATA_DIR_NAME)))
            .unwrap_or_else(|| cwd.join(DATA_DIR_NAME));

        GlobalContext { cwd, home }
    }

    /// Override the home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the gccforge home directory (~/.gccforge/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global cache directory for downloaded sources.
    pub fn cache_dir(&self) -> PathBuf {
        self.home.join("cache")
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the project-local data directory.
    pub fn project_dir(&self) -> PathBuf {
        self.cwd.join(DATA_DIR_NAME)
    }

    /// Get the project configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        self.project_dir().join("config.toml")
    }

    /// Load the merged global and project configuration.
    pub fn load_config(&self) -> Config {
        load_config(&self.config_path(), &self.project_config_path())
    }

    /// Resolve a possibly relative path against the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .with_home(tmp.path().join("home"));

        assert_eq!(ctx.cache_dir(), tmp.path().join("home/cache"));
        assert_eq!(ctx.config_path(), tmp.path().join("home/config.toml"));
        assert_eq!(ctx.project_config_path(), tmp.path().join(".gccforge/config.toml"));
        assert_eq!(ctx.resolve_path(Path::new("src")), tmp.path().join("src"));
        assert_eq!(ctx.resolve_path(Path::new("/abs")), PathBuf::from("/abs"));
    }

    #[test]
    fn test_load_config_reads_project_file() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .with_home(tmp.path().join("home"));

        std::fs::create_dir_all(ctx.project_dir()).unwrap();
        std::fs::write(ctx.project_config_path(), "[build]\njobs = 2\n").unwrap();

        assert_eq!(ctx.load_config().build.jobs, Some(2));
    }
}
