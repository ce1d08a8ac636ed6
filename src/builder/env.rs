//! Child process environment for the build.
//!
//! The environment is computed once from the caller's variables and the host
//! probe, then applied to every spawned step. Nothing here touches the
//! environment of the running process.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::host::HostProbe;
use crate::util::process::ProcessBuilder;

/// Flags added on hosts that prefer 64-bit code.
const M64: &str = "-m64";

/// Newer libstdc++ headers break the bootstrap when these are defined.
const CXX_DEBUG_UNDEFS: &str = "-U_GLIBCXX_DEBUG -U_GLIBCXX_DEBUG_PEDANTIC";

/// GCC picks its own linker; a forced `LD` breaks the build.
const LINKER_VAR: &str = "LD";

/// Variables to set and to remove for every build step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEnvironment {
    set: BTreeMap<String, String>,
    remove: BTreeSet<String>,
}

impl BuildEnvironment {
    /// Compute the build environment.
    ///
    /// `lookup` reads the caller's current value of a variable so existing
    /// flags are extended instead of replaced.
    pub fn new(
        host: &dyn HostProbe,
        jobs: Option<usize>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut env = BuildEnvironment::default();

        if host.prefers_64_bit() {
            for var in ["CFLAGS", "CXXFLAGS", "LDFLAGS"] {
                env.append(var, M64, &lookup);
            }
        }

        env.remove.insert(LINKER_VAR.to_string());

        env.append("CXXFLAGS", CXX_DEBUG_UNDEFS, &lookup);

        if let Some(jobs) = jobs.filter(|j| *j > 0) {
            env.set.insert("MAKEFLAGS".to_string(), format!("-j{}", jobs));
        }

        env
    }

    /// Build environment from the running process's variables.
    pub fn from_process(host: &dyn HostProbe, jobs: Option<usize>) -> Self {
        Self::new(host, jobs, |key| std::env::var(key).ok())
    }

    fn append(&mut self, key: &str, value: &str, lookup: &impl Fn(&str) -> Option<String>) {
        let current = self
            .set
            .get(key)
            .cloned()
            .or_else(|| lookup(key))
            .filter(|v| !v.trim().is_empty());
        let next = match current {
            Some(existing) => format!("{} {}", existing, value),
            None => value.to_string(),
        };
        self.set.insert(key.to_string(), next);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.set.get(key).map(String::as_str)
    }

    pub fn removes(&self, key: &str) -> bool {
        self.remove.contains(key)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.set.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.remove.iter().map(String::as_str)
    }

    /// Apply this environment to a process.
    pub fn apply(&self, mut cmd: ProcessBuilder) -> ProcessBuilder {
        for key in &self.remove {
            cmd = cmd.env_remove(key);
        }
        for (key, value) in &self.set {
            cmd = cmd.env(key, value);
        }
        cmd
    }
}
