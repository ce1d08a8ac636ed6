//! `gccforge fetch` command

use anyhow::Result;

use crate::cli::FetchArgs;
use gccforge::ops::fetch::{fetch, FetchOptions};
use gccforge::ops::install::effective_recipe;
use gccforge::util::shell::Status;
use gccforge::util::{GlobalContext, Shell};

pub fn execute(args: FetchArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.load_config();

    let recipe = effective_recipe(&config, args.gcc_version.as_deref())?;
    let opts = FetchOptions {
        cache_dir: args
            .cache_dir
            .as_deref()
            .map(|p| ctx.resolve_path(p))
            .unwrap_or_else(|| ctx.cache_dir()),
        force: args.force,
    };

    let result = fetch(&recipe, &opts, shell)?;
    shell.status(Status::Finished, format!("{} {}", recipe.name, recipe.version));

    println!("{}", result.source_dir.display());

    Ok(())
}
