//! Build host readiness checks.
//!
//! The `doctor` command answers one question: would `gccforge install` get
//! as far as running `configure` on this machine?
//!
//! ## Checks Performed
//!
//! - `make` availability (honours `--make`, `build.make` and `$MAKE`)
//! - `configure` script in the source tree, when one is given
//! - Otherwise, a source archive matching the selected version
//! - Every dependency the selected options need
//! - Command-line tools or an SDK to use as sysroot
//! - Host word size (informational)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::core::dependency::DependencyResolver;
use crate::core::host::HostProbe;
use crate::ops::install::{
    check_source_dir, dependency_resolver, effective_recipe, recipe_with_overrides, selected_options,
};
use crate::util::config::Config;
use crate::util::process::{find_executable, find_make, ProcessBuilder};

/// Result of a single health check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,

    /// Whether the check passed
    pub passed: bool,

    /// Human-readable status message
    pub message: String,

    /// Path to the tool or dependency (if applicable)
    pub path: Option<PathBuf>,

    /// Version string (if applicable)
    pub version: Option<String>,

    /// How long the check took
    pub duration: Duration,

    /// Whether this check is required or optional
    pub required: bool,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            version: None,
            duration: Duration::ZERO,
            required: true,
        }
    }

    /// Create a failing check result.
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            passed: false,
            ..CheckResult::pass(name, message)
        }
    }

    /// Mark this check as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    /// Individual check results
    pub checks: Vec<CheckResult>,

    /// Total time taken
    pub total_duration: Duration,

    /// Environment information
    pub environment: BTreeMap<String, String>,
}

impl DoctorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// Check if all required checks passed.
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    pub fn required_failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .count()
    }
}

/// Options for the doctor command.
#[derive(Debug, Clone, Default)]
pub struct DoctorOptions {
    /// Option names; empty means "use the config".
    pub options: Vec<String>,

    /// Source tree to check for `configure`.
    pub source_dir: Option<PathBuf>,

    /// `name=path` dependency specs.
    pub deps: Vec<String>,

    /// Root holding `opt/<name>` links.
    pub opt_root: Option<PathBuf>,

    /// `make` program to look for.
    pub make: Option<String>,
}

/// Run the doctor command.
///
/// Invalid option names or dependency specs are errors, not failed checks.
pub fn doctor(config: &Config, opts: &DoctorOptions, host: &dyn HostProbe) -> Result<DoctorReport> {
    let start = Instant::now();
    let mut report = DoctorReport::new();

    let recipe = recipe_with_overrides(config, None)?;
    let options = selected_options(config, &opts.options)?;
    let resolver = dependency_resolver(config, &opts.deps, opts.opt_root.as_deref())?;

    report
        .environment
        .insert("os".to_string(), std::env::consts::OS.to_string());
    report
        .environment
        .insert("arch".to_string(), std::env::consts::ARCH.to_string());
    report
        .environment
        .insert("recipe".to_string(), format!("{} {}", recipe.name, recipe.version));
    report
        .environment
        .insert("options".to_string(), options.to_string());

    report.add(check_make(opts.make.as_deref().or(config.build.make.as_deref())));

    match opts.source_dir {
        Some(ref source_dir) => report.add(check_configure(source_dir)),
        None => report.add(check_source_archive(config)),
    }

    for dep in recipe.required_dependencies(&options) {
        let check_start = Instant::now();
        let name = format!("Dependency {}", dep);
        let check = match resolver.resolve(dep) {
            Ok(path) => CheckResult::pass(name, format!("{} found", dep)).with_path(path),
            Err(e) => CheckResult::fail(name, e.to_string()),
        };
        report.add(check.with_duration(check_start.elapsed()));
    }

    report.add(check_sysroot(host));
    report.add(check_word_size(host));

    report.total_duration = start.elapsed();
    Ok(report)
}

/// Check for `make`, or the explicitly configured program.
fn check_make(configured: Option<&str>) -> CheckResult {
    let start = Instant::now();

    let found = match configured {
        Some(name) => find_executable(name),
        None => find_make(),
    };

    let Some(path) = found else {
        let wanted = configured.unwrap_or("make");
        return CheckResult::fail("Make", format!("`{}` not found in PATH", wanted))
            .with_duration(start.elapsed());
    };

    let mut check = CheckResult::pass("Make", format!("{} is available", path.display()));
    if let Ok(output) = ProcessBuilder::new(&path).arg("--version").exec() {
        if output.status.success() {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("")
                .trim()
                .to_string();
            if !version.is_empty() {
                check = check.with_version(version);
            }
        }
    }

    check.with_path(path).with_duration(start.elapsed())
}

/// Without a source tree, `install` needs an archive for the selected version.
fn check_source_archive(config: &Config) -> CheckResult {
    match effective_recipe(config, None) {
        Ok(recipe) => CheckResult::pass(
            "Source archive",
            format!("{} ({})", recipe.archive_name(), recipe.checksum),
        ),
        Err(e) => {
            let message = e.to_string();
            let first = message.lines().next().unwrap_or_default();
            CheckResult::fail("Source archive", first)
        }
    }
}

fn check_configure(source_dir: &Path) -> CheckResult {
    let start = Instant::now();
    let check = match check_source_dir(source_dir) {
        Ok(()) => CheckResult::pass("Configure script", "configure is executable")
            .with_path(source_dir.join("configure")),
        Err(e) => CheckResult::fail("Configure script", format!("{:#}", e)),
    };
    check.with_duration(start.elapsed())
}

/// Headers must come from the command-line tools or an SDK sysroot.
fn check_sysroot(host: &dyn HostProbe) -> CheckResult {
    if host.has_command_line_tools() {
        return CheckResult::pass("System headers", "command-line tools are installed");
    }
    match host.sdk_path() {
        Some(sdk) => CheckResult::pass("System headers", "using SDK as sysroot").with_path(sdk),
        None => CheckResult::fail(
            "System headers",
            "command-line tools are missing and no SDK path is known; set `host.sdk_path`",
        ),
    }
}

fn check_word_size(host: &dyn HostProbe) -> CheckResult {
    let message = if host.prefers_64_bit() {
        "building 64-bit code (-m64)"
    } else {
        "building with the default word size"
    };
    CheckResult::pass("Word size", message).optional()
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    writeln!(output, "gccforge doctor").unwrap();
    writeln!(output, "===============\n").unwrap();

    if verbose {
        writeln!(output, "Environment:").unwrap();
        for (key, value) in &report.environment {
            writeln!(output, "  {}: {}", key, value).unwrap();
        }
        writeln!(output).unwrap();
    }

    writeln!(output, "Checks:").unwrap();
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };

        writeln!(output, "  {} {}{}", status, check.name, required).unwrap();

        // Failures always explain themselves.
        if verbose || !check.passed {
            writeln!(output, "      {}", check.message).unwrap();
        }
        if verbose {
            if let Some(path) = &check.path {
                writeln!(output, "      Path: {}", path.display()).unwrap();
            }
            if let Some(version) = &check.version {
                writeln!(output, "      Version: {}", version).unwrap();
            }
        }
    }

    writeln!(output).unwrap();

    let passed = report.passed_count();
    let failed = report.failed_count();
    let required_failed = report.required_failed_count();

    writeln!(output, "Summary: {} passed, {} failed", passed, failed).unwrap();

    if required_failed > 0 {
        writeln!(
            output,
            "\n{} required check(s) failed. `gccforge install` will not succeed.",
            required_failed
        )
        .unwrap();
    } else {
        writeln!(output, "\nAll required checks passed. Ready to build.").unwrap();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::StaticHost;
    use crate::test_support::GccSourceFixture;

    fn all_deps() -> Vec<String> {
        ["gmp", "mpfr", "libmpc", "cloog", "isl"]
            .iter()
            .map(|d| format!("{}=/opt/{}", d, d))
            .collect()
    }

    #[test]
    fn test_check_result_optional() {
        let result = CheckResult::pass("test", "passed").optional();
        assert!(result.passed);
        assert!(!result.required);
        assert!(!CheckResult::fail("test", "missing").passed);
    }

    #[test]
    fn test_doctor_report_optional_failed() {
        let mut report = DoctorReport::new();
        report.add(CheckResult::pass("required", "ok"));
        report.add(CheckResult::fail("optional", "missing").optional());

        assert!(report.all_required_passed());
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.required_failed_count(), 0);
    }

    #[test]
    fn test_dependencies_are_checked() {
        let opts = DoctorOptions {
            deps: all_deps(),
            ..DoctorOptions::default()
        };
        let report = doctor(&Config::default(), &opts, &StaticHost::default()).unwrap();

        let deps: Vec<_> = report
            .checks
            .iter()
            .filter(|c| c.name.starts_with("Dependency"))
            .collect();
        assert_eq!(deps.len(), 5);
        assert!(deps.iter().all(|c| c.passed));
    }

    #[test]
    fn test_missing_ecj_fails_for_java() {
        let opts = DoctorOptions {
            options: vec!["enable-java".to_string()],
            deps: all_deps(),
            ..DoctorOptions::default()
        };
        let report = doctor(&Config::default(), &opts, &StaticHost::default()).unwrap();

        let ecj = report
            .checks
            .iter()
            .find(|c| c.name == "Dependency ecj")
            .unwrap();
        assert!(!ecj.passed);
        assert!(ecj.message.contains("`ecj` is not installed"));
        assert!(!report.all_required_passed());
    }

    #[test]
    fn test_configure_check() {
        let fixture = GccSourceFixture::new();
        assert!(check_configure(fixture.source_dir()).passed);

        let tmp = tempfile::TempDir::new().unwrap();
        let check = check_configure(tmp.path());
        assert!(!check.passed);
        assert!(check.message.contains("no configure script"));
    }

    #[test]
    fn test_source_archive_check_follows_version() {
        assert!(check_source_archive(&Config::default()).passed);

        let mut config = Config::default();
        config.source.version = Some("4.9.0".parse().unwrap());
        let check = check_source_archive(&config);
        assert!(!check.passed);
        assert!(check.message.contains("gcc48 4.9.0"));

        // A given source tree replaces the archive check.
        let fixture = GccSourceFixture::new();
        let opts = DoctorOptions {
            source_dir: Some(fixture.source_dir().to_path_buf()),
            deps: all_deps(),
            ..DoctorOptions::default()
        };
        let report = doctor(&config, &opts, &StaticHost::default()).unwrap();
        assert!(report.checks.iter().all(|c| c.name != "Source archive"));
        assert_eq!(report.environment["recipe"], "gcc48 4.9.0");
    }

    #[test]
    fn test_sysroot_check() {
        let mut host = StaticHost::default();
        assert!(check_sysroot(&host).passed);

        host.command_line_tools = false;
        assert!(!check_sysroot(&host).passed);

        host.sdk_path = Some(PathBuf::from("/SDKs/MacOSX10.8.sdk"));
        let check = check_sysroot(&host);
        assert!(check.passed);
        assert_eq!(check.path, Some(PathBuf::from("/SDKs/MacOSX10.8.sdk")));
    }

    #[test]
    fn test_missing_configured_make() {
        let check = check_make(Some("gccforge-no-such-make"));
        assert!(!check.passed);
        assert!(check.message.contains("gccforge-no-such-make"));
    }

    #[test]
    fn test_format_report() {
        let mut report = DoctorReport::new();
        report.add(CheckResult::pass("Make", "ok"));
        report.add(CheckResult::fail("Dependency isl", "dependency `isl` is not installed"));

        let text = format_report(&report, false);
        assert!(text.contains("[OK] Make"));
        assert!(text.contains("[!!] Dependency isl"));
        assert!(text.contains("dependency `isl` is not installed"));
        assert!(text.contains("Summary: 1 passed, 1 failed"));
    }
}
