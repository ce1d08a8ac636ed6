//! Planning and running a compiler install.
//!
//! Command-line values, configuration and host facts are merged here into a
//! single [`InstallPlan`], which is then executed.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::executor::{CommandRunner, InstallReport, PlanExecutor};
use crate::builder::plan::{InstallPlan, PlanRequest};
use crate::core::dependency::{ChainResolver, OptPrefixResolver, StaticResolver};
use crate::core::host::HostProbe;
use crate::core::options::OptionSet;
use crate::core::recipe::Recipe;
use crate::core::version::Version;
use crate::util::config::Config;
use crate::util::fs::is_executable;
use crate::util::process::find_make;
use crate::util::shell::{format_duration, Shell, Status};

/// `make` program used when none is configured or found.
pub const DEFAULT_MAKE: &str = "make";

/// Options for `gccforge install` and `gccforge plan`.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Option names from the command line. Empty means "use the config".
    pub options: Vec<String>,

    /// Keg root; falls back to `build.prefix`.
    pub prefix: Option<PathBuf>,

    /// Unpacked GCC source tree containing `configure`. Because the tree is
    /// given, `version` is not checked against the configured archive.
    pub source_dir: PathBuf,

    /// `name=path` dependency specs.
    pub deps: Vec<String>,

    /// Root holding `opt/<name>` links; falls back to `dependencies.opt_root`.
    pub opt_root: Option<PathBuf>,

    /// `make` program; falls back to `build.make`, then a PATH lookup.
    pub make: Option<String>,

    /// Parallel jobs; falls back to `build.jobs`.
    pub jobs: Option<usize>,

    /// Version override; falls back to `source.version`, then the recipe.
    pub version: Option<String>,
}

/// The recipe with configuration and command-line overrides applied.
///
/// The version may differ from the archive URL and checksum. Use this only
/// when building from an existing source tree.
pub fn recipe_with_overrides(config: &Config, version: Option<&str>) -> Result<Recipe> {
    let mut recipe = config.source.apply(Recipe::gcc48());
    if let Some(v) = version {
        recipe.version = Version::parse(v)?;
    }
    Ok(recipe)
}

/// The recipe whose archive is downloaded for the selected version.
///
/// The built-in URL and checksum only describe the built-in release, so any
/// other version needs both `source.url` and `source.checksum`. A command-line
/// version must also agree with `source.version` when that is set.
pub fn effective_recipe(config: &Config, version: Option<&str>) -> Result<Recipe> {
    let recipe = recipe_with_overrides(config, version)?;
    let builtin = Recipe::gcc48();
    if recipe.version == builtin.version {
        return Ok(recipe);
    }

    if config.source.url.is_none() || config.source.checksum.is_none() {
        bail!(
            "no source archive configured for {} {}\n\
             \n\
             The built-in URL and checksum are for {}. Set `source.url` and `source.checksum`\n\
             in .gccforge/config.toml for this version, or pass an unpacked tree with --source-dir.",
            recipe.name,
            recipe.version,
            builtin.version
        );
    }
    if let Some(ref configured) = config.source.version {
        if *configured != recipe.version {
            bail!(
                "version {} does not match `source.version` ({}) that `source.url` points at",
                recipe.version,
                configured
            );
        }
    }

    Ok(recipe)
}

/// The `make` program: `--make`, then `build.make`, then `$MAKE`, `gmake` or
/// `make` found on PATH.
pub fn make_program(cli: Option<&str>, config: &Config) -> String {
    match cli.or(config.build.make.as_deref()) {
        Some(make) => make.to_string(),
        None => find_make()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| DEFAULT_MAKE.to_string()),
    }
}

/// Selected options: command line if any were given, otherwise config.
pub fn selected_options(config: &Config, cli: &[String]) -> Result<OptionSet> {
    let names = if cli.is_empty() {
        config.build.options.as_slice()
    } else {
        cli
    };
    Ok(OptionSet::parse(names)?)
}

/// Build the dependency resolver.
///
/// Lookup order: `--dep` specs, then `[dependencies]` paths, then the
/// `opt/<name>` links under the opt root.
pub fn dependency_resolver(
    config: &Config,
    specs: &[String],
    opt_root: Option<&Path>,
) -> Result<ChainResolver> {
    let mut cli = StaticResolver::new();
    for spec in specs {
        let (dep, path) = StaticResolver::parse_spec(spec)?;
        cli.insert(dep, path);
    }

    let mut chain = ChainResolver::new()
        .push(cli)
        .push(config.dependencies.resolver()?);

    if let Some(root) = opt_root.or(config.dependencies.opt_root.as_deref()) {
        chain = chain.push(OptPrefixResolver::new(root));
    }

    Ok(chain)
}

/// Compute the install plan without running anything.
pub fn plan_install(
    config: &Config,
    opts: &InstallOptions,
    host: &dyn HostProbe,
) -> Result<InstallPlan> {
    let recipe = recipe_with_overrides(config, opts.version.as_deref())?;
    let options = selected_options(config, &opts.options)?;

    let prefix = opts
        .prefix
        .clone()
        .or_else(|| config.build.prefix.clone())
        .context("no installation prefix; pass --prefix or set `build.prefix` in config")?;

    let resolver = dependency_resolver(config, &opts.deps, opts.opt_root.as_deref())?;
    let make = make_program(opts.make.as_deref(), config);
    let jobs = opts.jobs.or(config.build.jobs);

    tracing::debug!("planning {} {} with options {}", recipe.name, recipe.version, options);

    let plan = InstallPlan::new(&PlanRequest {
        recipe: &recipe,
        options: &options,
        prefix: &prefix,
        source_dir: &opts.source_dir,
        resolver: &resolver,
        host,
        make: &make,
        jobs,
    })?;

    Ok(plan)
}

/// Plan and run an install.
pub fn install<R: CommandRunner>(
    config: &Config,
    opts: &InstallOptions,
    host: &dyn HostProbe,
    runner: R,
    shell: &Shell,
) -> Result<InstallReport> {
    check_source_dir(&opts.source_dir)?;

    shell.status(Status::Resolving, "dependencies");
    let plan = plan_install(config, opts, host)?;
    for (dep, path) in plan.dependencies.iter() {
        tracing::info!("{} -> {}", dep, path.display());
    }
    shell.note(format!(
        "{} {} with languages {}",
        plan.name, plan.version, plan.languages
    ));

    let report = PlanExecutor::new(runner, shell).execute(&plan)?;

    for path in &report.removed {
        shell.status(Status::Removed, path.display());
    }
    shell.status(
        Status::Finished,
        format!(
            "{} {} installed to {} in {}",
            plan.name,
            plan.version,
            plan.layout.prefix().display(),
            format_duration(report.duration)
        ),
    );

    Ok(report)
}

/// The source tree must contain a runnable `configure` script.
pub fn check_source_dir(source_dir: &Path) -> Result<()> {
    if !source_dir.is_dir() {
        bail!("source directory not found: {}", source_dir.display());
    }
    let configure = source_dir.join("configure");
    if !configure.exists() {
        bail!(
            "no configure script in {}\n\
             \n\
             Point --source-dir at an unpacked GCC source tree, or run `gccforge fetch`.",
            source_dir.display()
        );
    }
    if !is_executable(&configure) {
        bail!("{} is not executable", configure.display());
    }
    Ok(())
}
