//! Configure argument construction.
//!
//! Turns the selected options, resolved dependency prefixes and host facts
//! into the exact flag list handed to GCC's `configure`. The result is
//! deterministic for a given set of inputs.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::builder::layout::InstallLayout;
use crate::builder::BuildError;
use crate::core::dependency::{Dependency, DependencyError, ResolvedDependencies};
use crate::core::host::HostProbe;
use crate::core::options::{BuildOption, OptionSet};
use crate::core::version::Version;

/// Flags that are passed on every build.
const FIXED_FLAGS: [&str; 5] = [
    "--with-system-zlib",
    "--enable-stage1-checking",
    "--enable-plugin",
    "--enable-lto",
    // Only matters for HEAD builds, where warnings are errors.
    "--disable-werror",
];

/// Location of the ecj jar inside its prefix.
const ECJ_JAR: &str = "share/java/ecj.jar";

/// Header directory used when building against an SDK sysroot.
const NATIVE_SYSTEM_HEADER_DIR: &str = "/usr/include";

/// Ordered, frozen configure arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentList(Vec<String>);

impl ArgumentList {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|a| a == flag)
    }

    /// Arguments starting with `prefix`.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter().filter(move |a| a.starts_with(prefix))
    }
}

impl fmt::Display for ArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Builder that accumulates arguments until [`ArgsBuilder::finish`].
#[derive(Debug, Default)]
struct ArgsBuilder {
    args: Vec<String>,
}

impl ArgsBuilder {
    fn push(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    fn push_path(&mut self, flag: &str, path: &Path) -> &mut Self {
        self.push(format!("{}={}", flag, path.display()))
    }

    fn finish(self) -> ArgumentList {
        ArgumentList(self.args)
    }
}

/// Everything the argument list depends on.
pub struct ConfigureInputs<'a> {
    pub version: &'a Version,
    pub options: &'a OptionSet,
    pub layout: &'a InstallLayout,
    pub dependencies: &'a ResolvedDependencies,
    pub host: &'a dyn HostProbe,
}

/// Build the configure argument list.
///
/// `--enable-languages` is not part of the list; it is prepended when the
/// configure step is assembled.
pub fn configure_args(inputs: &ConfigureInputs<'_>) -> Result<ArgumentList, BuildError> {
    let ConfigureInputs {
        version,
        options,
        layout,
        dependencies,
        host,
    } = inputs;

    let mut args = ArgsBuilder::default();

    args.push_path("--prefix", &layout.gcc_prefix())
        .push_path("--datarootdir", &layout.share())
        .push_path("--bindir", &layout.bin())
        .push(format!("--program-suffix={}", version.program_suffix()));

    for dep in Dependency::LIBRARIES {
        let path = dependencies
            .get(dep)
            .ok_or(DependencyError::NotFound(dep))?;
        // LIBRARIES never contains ecj, so the configure name is always set.
        if let Some(name) = dep.configure_name() {
            args.push_path(&format!("--with-{}", name), path);
        }
    }

    for flag in FIXED_FLAGS {
        args.push(flag);
    }

    if !options.contains(BuildOption::EnableNls) {
        args.push("--disable-nls");
    }

    if options.wants_java() {
        let ecj = dependencies
            .get(Dependency::Ecj)
            .ok_or(DependencyError::NotFound(Dependency::Ecj))?;
        args.push_path("--with-ecj-jar", &ecj.join(ECJ_JAR));
    }

    if options.contains(BuildOption::EnableMultilib) {
        args.push("--enable-multilib");
    } else {
        args.push("--disable-multilib");
    }

    if !host.has_command_line_tools() {
        let sdk = host.sdk_path().ok_or(BuildError::MissingSdk)?;
        args.push(format!(
            "--with-native-system-header-dir={}",
            NATIVE_SYSTEM_HEADER_DIR
        ))
        .push_path("--with-sysroot", &sdk);
    }

    Ok(args.finish())
}
