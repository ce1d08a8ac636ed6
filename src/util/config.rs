//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `~/.gccforge/config.toml` - user-wide defaults
//! - Project: `.gccforge/config.toml` - overrides for the current directory
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.
//!
//! ```toml
//! [build]
//! prefix = "/usr/local/Cellar/gcc48/4.8.0"
//! options = ["enable-cxx", "enable-fortran"]
//! make = "gmake"
//! jobs = 8
//!
//! [dependencies]
//! gmp = "/usr/local/opt/gmp"
//! opt_root = "/usr/local"
//!
//! [source]
//! url = "https://ftpmirror.gnu.org/gcc/gcc-4.8.0/gcc-4.8.0.tar.bz2"
//!
//! [host]
//! sdk_path = "/Applications/Xcode.app/Contents/Developer/Platforms/MacOSX.platform/Developer/SDKs/MacOSX10.8.sdk"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::dependency::{Dependency, StaticResolver};
use crate::core::recipe::{Checksum, Recipe};
use crate::core::version::Version;

/// gccforge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Dependency locations
    pub dependencies: DependenciesConfig,

    /// Source archive overrides
    pub source: SourceConfig,

    /// Host probe overrides
    pub host: HostConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Installation prefix (keg root)
    pub prefix: Option<PathBuf>,

    /// Options selected when none are given on the command line
    pub options: Vec<String>,

    /// `make` program to use
    pub make: Option<String>,

    /// Parallel make jobs
    pub jobs: Option<usize>,
}

/// Dependency locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DependenciesConfig {
    /// Root holding `opt/<name>` links, e.g. `/usr/local`
    pub opt_root: Option<PathBuf>,

    /// Explicit dependency prefixes by name
    #[serde(flatten)]
    pub paths: BTreeMap<String, PathBuf>,
}

impl DependenciesConfig {
    /// Build a resolver from the explicit paths. Unknown names are an error.
    pub fn resolver(&self) -> Result<StaticResolver> {
        let mut resolver = StaticResolver::new();
        for (name, path) in &self.paths {
            let dep: Dependency = name
                .parse()
                .with_context(|| format!("in [dependencies] entry `{}`", name))?;
            resolver.insert(dep, path);
        }
        Ok(resolver)
    }
}

/// Overrides for the built-in recipe's source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Mirror URL for the release archive
    pub url: Option<String>,

    /// Checksum matching `url`, e.g. `sha256:<hex>`
    pub checksum: Option<Checksum>,

    /// Version to build
    pub version: Option<Version>,
}

impl SourceConfig {
    /// Apply these overrides to a recipe.
    pub fn apply(&self, mut recipe: Recipe) -> Recipe {
        if let Some(ref url) = self.url {
            recipe.url = url.clone();
        }
        if let Some(ref checksum) = self.checksum {
            recipe.checksum = checksum.clone();
        }
        if let Some(ref version) = self.version {
            recipe.version = version.clone();
        }
        recipe
    }
}

/// Host probe overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// SDK path used as sysroot when command-line tools are missing
    pub sdk_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.prefix.is_some() {
            self.build.prefix = other.build.prefix;
        }
        if !other.build.options.is_empty() {
            self.build.options = other.build.options;
        }
        if other.build.make.is_some() {
            self.build.make = other.build.make;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }

        if other.dependencies.opt_root.is_some() {
            self.dependencies.opt_root = other.dependencies.opt_root;
        }
        self.dependencies.paths.extend(other.dependencies.paths);

        if other.source.url.is_some() {
            self.source.url = other.source.url;
        }
        if other.source.checksum.is_some() {
            self.source.checksum = other.source.checksum;
        }
        if other.source.version.is_some() {
            self.source.version = other.source.version;
        }

        if other.host.sdk_path.is_some() {
            self.host.sdk_path = other.host.sdk_path;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.gccforge/config.toml)
/// 2. Global config (~/.gccforge/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dependency::DependencyResolver;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
[build]
prefix = "/keg"
options = ["enable-cxx"]
jobs = 4

[dependencies]
opt_root = "/usr/local"
gmp = "/custom/gmp"
mpc = "/custom/mpc"

[source]
url = "https://mirror.example/gcc-4.8.0.tar.bz2"
checksum = "sha1:b4ee6e9bdebc65223f95067d0cc1a634b59dad72"
"#,
        )
        .unwrap();

        assert_eq!(config.build.prefix, Some(PathBuf::from("/keg")));
        assert_eq!(config.build.options, vec!["enable-cxx".to_string()]);
        assert_eq!(config.build.jobs, Some(4));
        assert_eq!(config.dependencies.opt_root, Some(PathBuf::from("/usr/local")));
        assert_eq!(config.dependencies.paths.len(), 2);

        let resolver = config.dependencies.resolver().unwrap();
        assert_eq!(
            resolver.resolve(Dependency::Libmpc).unwrap(),
            PathBuf::from("/custom/mpc")
        );

        let recipe = config.source.apply(Recipe::gcc48());
        assert_eq!(recipe.url, "https://mirror.example/gcc-4.8.0.tar.bz2");
        assert_eq!(recipe.version.as_str(), "4.8.0");
    }

    #[test]
    fn test_unknown_dependency_name_is_rejected() {
        let config: Config = toml::from_str("[dependencies]\nzlib = \"/x\"\n").unwrap();
        assert!(config.dependencies.resolver().is_err());
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(
            &global,
            "[build]\nprefix = \"/global\"\nmake = \"gmake\"\n[dependencies]\ngmp = \"/g/gmp\"\nisl = \"/g/isl\"\n",
        )
        .unwrap();
        std::fs::write(&project, "[build]\nprefix = \"/project\"\n[dependencies]\nisl = \"/p/isl\"\n")
            .unwrap();

        let config = load_config(&global, &project);
        assert_eq!(config.build.prefix, Some(PathBuf::from("/project")));
        assert_eq!(config.build.make.as_deref(), Some("gmake"));
        assert_eq!(config.dependencies.paths["gmp"], PathBuf::from("/g/gmp"));
        assert_eq!(config.dependencies.paths["isl"], PathBuf::from("/p/isl"));
    }

    #[test]
    fn test_missing_and_invalid_files_fall_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let broken = tmp.path().join("broken.toml");
        std::fs::write(&broken, "[build\n").unwrap();

        let config = load_config(&tmp.path().join("missing.toml"), &broken);
        assert!(config.build.prefix.is_none());
        assert!(config.dependencies.paths.is_empty());
    }
}
