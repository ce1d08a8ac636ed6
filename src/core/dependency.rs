//! External library dependencies and their resolution.
//!
//! The build never looks dependencies up through a global registry. Callers
//! hand in a [`DependencyResolver`] and every required dependency is resolved
//! up front, before any process is spawned.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A package the compiler build links against or needs at configure time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dependency {
    Gmp,
    Mpfr,
    Libmpc,
    Cloog,
    Isl,
    /// Eclipse Java compiler, only needed when building gcj.
    Ecj,
}

impl Dependency {
    /// Libraries every build requires, in configure-flag order.
    pub const LIBRARIES: [Dependency; 5] = [
        Dependency::Gmp,
        Dependency::Mpfr,
        Dependency::Libmpc,
        Dependency::Cloog,
        Dependency::Isl,
    ];

    /// Package name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dependency::Gmp => "gmp",
            Dependency::Mpfr => "mpfr",
            Dependency::Libmpc => "libmpc",
            Dependency::Cloog => "cloog",
            Dependency::Isl => "isl",
            Dependency::Ecj => "ecj",
        }
    }

    /// Name used in the `--with-<name>=` configure flag.
    ///
    /// Returns `None` for ecj, which is passed as a jar path instead.
    pub fn configure_name(&self) -> Option<&'static str> {
        match self {
            Dependency::Gmp => Some("gmp"),
            Dependency::Mpfr => Some("mpfr"),
            Dependency::Libmpc => Some("mpc"),
            Dependency::Cloog => Some("cloog"),
            Dependency::Isl => Some("isl"),
            Dependency::Ecj => None,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dependency {
    type Err = DependencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gmp" => Ok(Dependency::Gmp),
            "mpfr" => Ok(Dependency::Mpfr),
            "libmpc" | "mpc" => Ok(Dependency::Libmpc),
            "cloog" => Ok(Dependency::Cloog),
            "isl" => Ok(Dependency::Isl),
            "ecj" => Ok(Dependency::Ecj),
            _ => Err(DependencyError::Unknown(s.to_string())),
        }
    }
}

/// Error during dependency resolution.
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("dependency `{0}` is not installed")]
    NotFound(Dependency),

    #[error("unknown dependency `{0}`")]
    Unknown(String),

    #[error("invalid dependency spec `{0}`, expected NAME=PATH")]
    InvalidSpec(String),
}

/// Resolves a dependency to its installation prefix.
pub trait DependencyResolver {
    fn resolve(&self, dep: Dependency) -> Result<PathBuf, DependencyError>;
}

impl<R: DependencyResolver + ?Sized> DependencyResolver for &R {
    fn resolve(&self, dep: Dependency) -> Result<PathBuf, DependencyError> {
        (**self).resolve(dep)
    }
}

/// Resolver backed by an explicit name to path table.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    paths: BTreeMap<Dependency, PathBuf>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the path for a dependency.
    pub fn with(mut self, dep: Dependency, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(dep, path.into());
        self
    }

    pub fn insert(&mut self, dep: Dependency, path: impl Into<PathBuf>) {
        self.paths.insert(dep, path.into());
    }

    /// Resolve every known dependency to the same prefix.
    pub fn uniform(prefix: impl AsRef<Path>) -> Self {
        let prefix = prefix.as_ref();
        Dependency::LIBRARIES
            .iter()
            .chain(std::iter::once(&Dependency::Ecj))
            .fold(Self::new(), |r, dep| r.with(*dep, prefix))
    }

    /// Parse a `name=path` spec as given on the command line.
    pub fn parse_spec(spec: &str) -> Result<(Dependency, PathBuf), DependencyError> {
        let (name, path) = spec
            .split_once('=')
            .ok_or_else(|| DependencyError::InvalidSpec(spec.to_string()))?;
        if path.is_empty() {
            return Err(DependencyError::InvalidSpec(spec.to_string()));
        }
        Ok((name.parse()?, PathBuf::from(path)))
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl DependencyResolver for StaticResolver {
    fn resolve(&self, dep: Dependency) -> Result<PathBuf, DependencyError> {
        self.paths
            .get(&dep)
            .cloned()
            .ok_or(DependencyError::NotFound(dep))
    }
}

/// Resolver for package-manager style `<root>/opt/<name>` links.
#[derive(Debug, Clone)]
pub struct OptPrefixResolver {
    root: PathBuf,
}

impl OptPrefixResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        OptPrefixResolver { root: root.into() }
    }
}

impl DependencyResolver for OptPrefixResolver {
    fn resolve(&self, dep: Dependency) -> Result<PathBuf, DependencyError> {
        let path = self.root.join("opt").join(dep.as_str());
        if path.is_dir() {
            Ok(path)
        } else {
            tracing::debug!("{} not found at {}", dep, path.display());
            Err(DependencyError::NotFound(dep))
        }
    }
}

/// Tries resolvers in order; the first hit wins.
#[derive(Default)]
pub struct ChainResolver {
    resolvers: Vec<Box<dyn DependencyResolver>>,
}

impl ChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, resolver: impl DependencyResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }
}

impl DependencyResolver for ChainResolver {
    fn resolve(&self, dep: Dependency) -> Result<PathBuf, DependencyError> {
        for resolver in &self.resolvers {
            if let Ok(path) = resolver.resolve(dep) {
                return Ok(path);
            }
        }
        Err(DependencyError::NotFound(dep))
    }
}

/// Dependency prefixes after resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedDependencies {
    paths: BTreeMap<Dependency, PathBuf>,
}

impl ResolvedDependencies {
    /// Resolve every dependency in `required`, failing on the first miss.
    pub fn resolve_all(
        resolver: &dyn DependencyResolver,
        required: &[Dependency],
    ) -> Result<Self, DependencyError> {
        let mut paths = BTreeMap::new();
        for dep in required {
            let path = resolver.resolve(*dep)?;
            tracing::debug!("resolved {} -> {}", dep, path.display());
            paths.insert(*dep, path);
        }
        Ok(ResolvedDependencies { paths })
    }

    pub fn get(&self, dep: Dependency) -> Option<&Path> {
        self.paths.get(&dep).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dependency, &Path)> {
        self.paths.iter().map(|(d, p)| (*d, p.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_static_resolver() {
        let resolver = StaticResolver::new().with(Dependency::Gmp, "/opt/gmp");
        assert_eq!(resolver.resolve(Dependency::Gmp).unwrap(), PathBuf::from("/opt/gmp"));
        assert!(matches!(
            resolver.resolve(Dependency::Isl),
            Err(DependencyError::NotFound(Dependency::Isl))
        ));
    }

    #[test]
    fn test_parse_spec() {
        let (dep, path) = StaticResolver::parse_spec("mpc=/usr/local/opt/libmpc").unwrap();
        assert_eq!(dep, Dependency::Libmpc);
        assert_eq!(path, PathBuf::from("/usr/local/opt/libmpc"));

        assert!(StaticResolver::parse_spec("gmp").is_err());
        assert!(StaticResolver::parse_spec("gmp=").is_err());
        assert!(matches!(
            StaticResolver::parse_spec("zlib=/x"),
            Err(DependencyError::Unknown(_))
        ));
    }

    #[test]
    fn test_opt_prefix_resolver() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("opt/gmp")).unwrap();

        let resolver = OptPrefixResolver::new(tmp.path());
        assert_eq!(
            resolver.resolve(Dependency::Gmp).unwrap(),
            tmp.path().join("opt/gmp")
        );
        assert!(resolver.resolve(Dependency::Mpfr).is_err());
    }

    #[test]
    fn test_chain_resolver_first_hit_wins() {
        let chain = ChainResolver::new()
            .push(StaticResolver::new().with(Dependency::Gmp, "/first"))
            .push(StaticResolver::uniform("/second"));

        assert_eq!(chain.resolve(Dependency::Gmp).unwrap(), PathBuf::from("/first"));
        assert_eq!(chain.resolve(Dependency::Isl).unwrap(), PathBuf::from("/second"));
        assert!(ChainResolver::new().resolve(Dependency::Isl).is_err());
    }

    #[test]
    fn test_resolve_all_stops_at_first_missing() {
        let resolver = StaticResolver::new()
            .with(Dependency::Gmp, "/x")
            .with(Dependency::Mpfr, "/x");
        let err = ResolvedDependencies::resolve_all(&resolver, &Dependency::LIBRARIES).unwrap_err();
        assert!(matches!(err, DependencyError::NotFound(Dependency::Libmpc)));
        assert_eq!(err.to_string(), "dependency `libmpc` is not installed");
    }
}
