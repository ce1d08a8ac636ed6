//! gccforge CLI - build and install GCC 4.8 from source

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use gccforge::util::shell::{ColorChoice, Shell};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("gccforge=debug")
    } else if cli.quiet {
        EnvFilter::new("gccforge=error")
    } else {
        EnvFilter::new("gccforge=info")
    };

    // stdout is reserved for command output such as `plan --json`.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let shell = Shell::from_flags(cli.quiet, cli.verbose, color);

    match cli.command {
        Commands::Install(args) => commands::install::execute(args, &shell),
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Options(args) => commands::options::execute(args),
        Commands::Fetch(args) => commands::fetch::execute(args, &shell),
        Commands::Doctor(args) => commands::doctor::execute(args, &shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
