//! `gccforge install` command

use anyhow::Result;

use super::{install_options, system_host};
use crate::cli::InstallArgs;
use gccforge::builder::executor::SystemRunner;
use gccforge::ops::install::install;
use gccforge::util::{GlobalContext, Shell};

pub fn execute(args: InstallArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.load_config();

    let opts = install_options(&ctx, &config, &args.build)?;
    let host = system_host(&config, args.build.sdk_path.as_ref());

    install(&config, &opts, &host, SystemRunner, shell)?;

    Ok(())
}
