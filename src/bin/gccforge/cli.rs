//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// gccforge - build and install GCC 4.8 from source
#[derive(Parser)]
#[command(name = "gccforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure, bootstrap and install GCC into a prefix
    Install(InstallArgs),

    /// Show what `install` would run, without running it
    Plan(PlanArgs),

    /// List the build options the recipe understands
    Options(OptionsArgs),

    /// Download, verify and unpack the GCC source archive
    Fetch(FetchArgs),

    /// Check that this machine can build GCC
    Doctor(DoctorArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Build option flags.
#[derive(Args, Debug, Clone, Default)]
pub struct OptionFlags {
    /// Build the g++ compiler
    #[arg(long)]
    pub enable_cxx: bool,

    /// Build the gfortran compiler
    #[arg(long)]
    pub enable_fortran: bool,

    /// Build the gcj compiler
    #[arg(long)]
    pub enable_java: bool,

    /// Enable Objective-C language support
    #[arg(long)]
    pub enable_objc: bool,

    /// Enable Objective-C++ language support
    #[arg(long)]
    pub enable_objcxx: bool,

    /// Enable all compilers and languages, except Ada
    #[arg(long)]
    pub enable_all_languages: bool,

    /// Build with native language support (localization)
    #[arg(long)]
    pub enable_nls: bool,

    /// Make use of profile guided optimization when bootstrapping GCC
    #[arg(long)]
    pub enable_profiled_build: bool,

    /// Build with multilib support
    #[arg(long)]
    pub enable_multilib: bool,

    /// Select an option by name (repeatable)
    #[arg(long = "option", value_name = "NAME")]
    pub options: Vec<String>,
}

impl OptionFlags {
    /// All selected option names, flags first.
    pub fn names(&self) -> Vec<String> {
        let flags = [
            (self.enable_cxx, "enable-cxx"),
            (self.enable_fortran, "enable-fortran"),
            (self.enable_java, "enable-java"),
            (self.enable_objc, "enable-objc"),
            (self.enable_objcxx, "enable-objcxx"),
            (self.enable_all_languages, "enable-all-languages"),
            (self.enable_nls, "enable-nls"),
            (self.enable_profiled_build, "enable-profiled-build"),
            (self.enable_multilib, "enable-multilib"),
        ];

        flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, name)| name.to_string())
            .chain(self.options.iter().cloned())
            .collect()
    }
}

/// Where dependencies are found.
#[derive(Args, Debug, Clone, Default)]
pub struct DependencyArgs {
    /// Dependency prefix as NAME=PATH (repeatable)
    #[arg(long = "dep", value_name = "NAME=PATH")]
    pub deps: Vec<String>,

    /// Root holding opt/<name> dependency links
    #[arg(long, value_name = "DIR")]
    pub opt_root: Option<PathBuf>,
}

/// Inputs shared by `install` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub flags: OptionFlags,

    #[command(flatten)]
    pub dependencies: DependencyArgs,

    /// Installation prefix (keg root)
    #[arg(long, value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    /// Unpacked GCC source tree (defaults to the fetched source)
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// make program to use
    #[arg(long, value_name = "PROGRAM")]
    pub make: Option<String>,

    /// Number of parallel make jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// GCC version to build instead of the recipe's
    #[arg(long = "version", value_name = "VERSION")]
    pub gcc_version: Option<String>,

    /// SDK to use as sysroot when command-line tools are missing
    #[arg(long, value_name = "DIR")]
    pub sdk_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub build: BuildArgs,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Emit the plan as JSON
    #[arg(long)]
    pub json: bool,

    /// Plan as if command-line tools were not installed
    #[arg(long)]
    pub without_command_line_tools: bool,

    /// Plan as if the host did not prefer 64-bit code
    #[arg(long)]
    pub no_m64: bool,
}

#[derive(Args)]
pub struct OptionsArgs {
    /// Emit options as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FetchArgs {
    /// Cache directory (defaults to ~/.gccforge/cache)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Download again even if a verified archive is cached
    #[arg(long)]
    pub force: bool,

    /// GCC version to fetch instead of the recipe's
    #[arg(long = "version", value_name = "VERSION")]
    pub gcc_version: Option<String>,
}

#[derive(Args)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub flags: OptionFlags,

    #[command(flatten)]
    pub dependencies: DependencyArgs,

    /// GCC source tree to check for a configure script
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// make program to look for
    #[arg(long, value_name = "PROGRAM")]
    pub make: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
