//! `gccforge doctor` command

use anyhow::Result;

use super::system_host;
use crate::cli::DoctorArgs;
use gccforge::ops::doctor::{doctor, format_report, DoctorOptions};
use gccforge::util::{GlobalContext, Shell};

pub fn execute(args: DoctorArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.load_config();

    let options = DoctorOptions {
        options: args.flags.names(),
        source_dir: args.source_dir.as_deref().map(|p| ctx.resolve_path(p)),
        deps: args.dependencies.deps.clone(),
        opt_root: args
            .dependencies
            .opt_root
            .as_deref()
            .map(|p| ctx.resolve_path(p)),
        make: args.make.clone(),
    };

    let report = doctor(&config, &options, &system_host(&config, None))?;

    print!("{}", format_report(&report, shell.is_verbose()));

    // Exit with error code if required checks failed
    if !report.all_required_passed() {
        std::process::exit(1);
    }

    Ok(())
}
