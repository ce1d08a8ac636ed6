//! Install plan: the complete, ordered description of one build.
//!
//! A plan is computed without spawning anything. It can be printed
//! (`gccforge plan`) or handed to the executor.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::configure::{configure_args, ArgumentList, ConfigureInputs};
use crate::builder::env::BuildEnvironment;
use crate::builder::layout::InstallLayout;
use crate::builder::BuildError;
use crate::core::dependency::{DependencyResolver, ResolvedDependencies};
use crate::core::host::HostProbe;
use crate::core::language::LanguageSet;
use crate::core::options::{BuildOption, OptionSet};
use crate::core::recipe::Recipe;

/// Name of the out-of-tree build directory inside the source tree.
pub const BUILD_DIR_NAME: &str = "build";

/// Kind of build step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Configure,
    Bootstrap,
    Install,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Configure => "configure",
            StepKind::Bootstrap => "bootstrap",
            StepKind::Install => "install",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external command run in the build directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStep {
    pub kind: StepKind,
    pub program: String,
    pub args: Vec<String>,
}

impl BuildStep {
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Inputs for planning an install.
pub struct PlanRequest<'a> {
    pub recipe: &'a Recipe,
    pub options: &'a OptionSet,
    pub prefix: &'a Path,
    pub source_dir: &'a Path,
    pub resolver: &'a dyn DependencyResolver,
    pub host: &'a dyn HostProbe,
    /// `make` program name or path.
    pub make: &'a str,
    /// Parallel make jobs, exported as MAKEFLAGS.
    pub jobs: Option<usize>,
}

/// Complete description of an install.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallPlan {
    pub name: String,
    pub version: String,
    pub options: OptionSet,
    pub languages: LanguageSet,
    pub dependencies: ResolvedDependencies,
    pub layout: InstallLayout,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub arguments: ArgumentList,
    pub environment: BuildEnvironment,
    pub steps: Vec<BuildStep>,
    /// Directories removed after a successful install.
    pub cleanup: Vec<PathBuf>,
}

impl InstallPlan {
    /// Compute the plan for a request.
    ///
    /// Fails before anything is spawned if a required dependency cannot be
    /// resolved.
    pub fn new(req: &PlanRequest<'_>) -> Result<Self, BuildError> {
        let languages = LanguageSet::from_options(req.options);

        let required = req.recipe.required_dependencies(req.options);
        let dependencies = ResolvedDependencies::resolve_all(req.resolver, &required)?;

        let layout = InstallLayout::new(req.prefix);
        let arguments = configure_args(&ConfigureInputs {
            version: &req.recipe.version,
            options: req.options,
            layout: &layout,
            dependencies: &dependencies,
            host: req.host,
        })?;

        let environment = BuildEnvironment::from_process(req.host, req.jobs);
        let steps = Self::steps(req.options, &languages, &arguments, req.make);

        Ok(InstallPlan {
            name: req.recipe.name.clone(),
            version: req.recipe.version.to_string(),
            options: req.options.clone(),
            languages,
            dependencies,
            cleanup: vec![layout.man7()],
            layout,
            source_dir: req.source_dir.to_path_buf(),
            build_dir: req.source_dir.join(BUILD_DIR_NAME),
            arguments,
            environment,
            steps,
        })
    }

    fn steps(
        options: &OptionSet,
        languages: &LanguageSet,
        arguments: &ArgumentList,
        make: &str,
    ) -> Vec<BuildStep> {
        let mut configure_args = vec![languages.to_configure_flag()];
        configure_args.extend(arguments.iter().map(str::to_string));

        // Profiled bootstrap takes longer and fails more often, but yields a
        // faster compiler.
        let bootstrap_target = if options.contains(BuildOption::EnableProfiledBuild) {
            "profiledbootstrap"
        } else {
            "bootstrap"
        };

        vec![
            BuildStep {
                kind: StepKind::Configure,
                program: "../configure".to_string(),
                args: configure_args,
            },
            BuildStep {
                kind: StepKind::Bootstrap,
                program: make.to_string(),
                args: vec![bootstrap_target.to_string()],
            },
            BuildStep {
                kind: StepKind::Install,
                program: make.to_string(),
                args: vec!["install".to_string()],
            },
        ]
    }

    pub fn step(&self, kind: StepKind) -> Option<&BuildStep> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    /// Human readable summary.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{} {}\n", self.name, self.version));
        out.push_str(&format!("  options:    {}\n", self.options));
        out.push_str(&format!("  languages:  {}\n", self.languages));
        out.push_str(&format!("  prefix:     {}\n", self.layout.prefix().display()));
        out.push_str(&format!("  build dir:  {}\n", self.build_dir.display()));
        out.push_str("  dependencies:\n");
        for (dep, path) in self.dependencies.iter() {
            out.push_str(&format!("    {:<8} {}\n", dep.as_str(), path.display()));
        }
        out.push_str("  environment:\n");
        for (key, value) in self.environment.vars() {
            out.push_str(&format!("    {}={}\n", key, value));
        }
        for key in self.environment.removed() {
            out.push_str(&format!("    unset {}\n", key));
        }
        out.push_str("  steps:\n");
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("    {}. {}\n", i + 1, step.display_command()));
        }
        for path in &self.cleanup {
            out.push_str(&format!("  remove after install: {}\n", path.display()));
        }
        out
    }
}
