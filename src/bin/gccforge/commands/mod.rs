//! Command implementations

pub mod completions;
pub mod doctor;
pub mod fetch;
pub mod install;
pub mod options;
pub mod plan;

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::BuildArgs;
use gccforge::core::host::SystemHost;
use gccforge::ops::install::{effective_recipe, InstallOptions};
use gccforge::util::{Config, GlobalContext};

/// Turn `install`/`plan` arguments into operation options.
///
/// Without `--source-dir`, the tree unpacked by `gccforge fetch` is used.
pub fn install_options(ctx: &GlobalContext, config: &Config, args: &BuildArgs) -> Result<InstallOptions> {
    let source_dir = match args.source_dir {
        Some(ref dir) => ctx.resolve_path(dir),
        None => {
            let recipe = effective_recipe(config, args.gcc_version.as_deref())?;
            fetched_source_dir(ctx, &recipe.name, recipe.version.as_str())
        }
    };

    Ok(InstallOptions {
        options: args.flags.names(),
        prefix: args.prefix.as_deref().map(|p| ctx.resolve_path(p)),
        source_dir,
        deps: args.dependencies.deps.clone(),
        opt_root: args
            .dependencies
            .opt_root
            .as_deref()
            .map(|p| ctx.resolve_path(p)),
        make: args.make.clone(),
        jobs: args.jobs,
        version: args.gcc_version.clone(),
    })
}

/// Where `gccforge fetch` unpacks sources.
pub fn fetched_source_dir(ctx: &GlobalContext, name: &str, version: &str) -> PathBuf {
    ctx.cache_dir().join("src").join(format!("{}-{}", name, version))
}

/// Host probe honouring `--sdk-path` and `host.sdk_path`.
pub fn system_host(config: &Config, sdk_path: Option<&PathBuf>) -> SystemHost {
    SystemHost::new().with_sdk_path(sdk_path.cloned().or_else(|| config.host.sdk_path.clone()))
}
