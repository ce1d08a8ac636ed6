//! `gccforge plan` command

use anyhow::{Context, Result};

use super::{install_options, system_host};
use crate::cli::PlanArgs;
use gccforge::core::host::StaticHost;
use gccforge::ops::install::plan_install;
use gccforge::util::GlobalContext;

pub fn execute(args: PlanArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.load_config();

    let opts = install_options(&ctx, &config, &args.build)?;

    let mut host = StaticHost::capture(&system_host(&config, args.build.sdk_path.as_ref()));
    if args.without_command_line_tools {
        host.command_line_tools = false;
    }
    if args.no_m64 {
        host.prefers_64_bit = false;
    }

    let plan = plan_install(&config, &opts, &host)?;

    if args.json {
        let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
        println!("{}", json);
    } else {
        print!("{}", plan.describe());
    }

    Ok(())
}
