//! Plan execution.
//!
//! Runs the plan's steps one after another in a fresh build directory. The
//! first failing step aborts the install; nothing is retried or rolled back.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::builder::plan::{BuildStep, InstallPlan, StepKind};
use crate::builder::BuildError;
use crate::util::process::ProcessBuilder;
use crate::util::shell::{Shell, Status};

/// Outcome of running one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus {
    pub success: bool,
    pub code: Option<i32>,
}

impl StepStatus {
    pub fn success() -> Self {
        StepStatus {
            success: true,
            code: Some(0),
        }
    }

    pub fn failure(code: i32) -> Self {
        StepStatus {
            success: false,
            code: Some(code),
        }
    }
}

/// Runs external commands.
pub trait CommandRunner {
    fn run(&mut self, cmd: &ProcessBuilder) -> std::io::Result<StepStatus>;
}

/// Runner that spawns real processes with inherited stdio.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, cmd: &ProcessBuilder) -> std::io::Result<StepStatus> {
        let status = cmd.status_io()?;
        Ok(StepStatus {
            success: status.success(),
            code: status.code(),
        })
    }
}

/// Summary of a finished install.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub steps: Vec<StepKind>,
    pub removed: Vec<std::path::PathBuf>,
    pub duration: Duration,
}

/// Executes install plans.
pub struct PlanExecutor<'a, R: CommandRunner> {
    runner: R,
    shell: &'a Shell,
}

impl<'a, R: CommandRunner> PlanExecutor<'a, R> {
    pub fn new(runner: R, shell: &'a Shell) -> Self {
        PlanExecutor { runner, shell }
    }

    /// Consume the executor and return its runner.
    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Run every step, then remove the cleanup paths.
    pub fn execute(&mut self, plan: &InstallPlan) -> Result<InstallReport, BuildError> {
        let start = Instant::now();

        prepare_build_dir(&plan.build_dir)?;

        let mut steps = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            self.run_step(plan, step)?;
            steps.push(step.kind);
        }

        let mut removed = Vec::new();
        for path in &plan.cleanup {
            if path.exists() {
                tracing::debug!("removing {}", path.display());
                fs::remove_dir_all(path).map_err(|source| BuildError::Cleanup {
                    path: path.clone(),
                    source,
                })?;
                removed.push(path.clone());
            }
        }

        Ok(InstallReport {
            steps,
            removed,
            duration: start.elapsed(),
        })
    }

    fn run_step(&mut self, plan: &InstallPlan, step: &BuildStep) -> Result<(), BuildError> {
        let status = match step.kind {
            StepKind::Configure => Status::Configuring,
            StepKind::Bootstrap => Status::Building,
            StepKind::Install => Status::Installing,
        };
        self.shell.status(status, step.display_command());

        let cmd = plan.environment.apply(
            ProcessBuilder::new(&step.program)
                .args(&step.args)
                .cwd(&plan.build_dir),
        );
        tracing::debug!("running `{}` in {}", cmd.display_command(), plan.build_dir.display());

        let outcome = self.runner.run(&cmd).map_err(|source| BuildError::Spawn {
            step: step.kind,
            command: step.display_command(),
            source,
        })?;

        if !outcome.success {
            return Err(BuildError::StepFailed {
                step: step.kind,
                command: step.display_command(),
                code: outcome.code,
            });
        }

        Ok(())
    }
}

/// Recreate the build directory so no state from a previous attempt leaks in.
fn prepare_build_dir(dir: &Path) -> Result<(), BuildError> {
    let io_err = |source| BuildError::BuildDir {
        path: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(io_err)?;
    }
    fs::create_dir_all(dir).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::builder::plan::PlanRequest;
    use crate::core::dependency::StaticResolver;
    use crate::core::host::StaticHost;
    use crate::core::options::{BuildOption, OptionSet};
    use crate::core::recipe::Recipe;
    use crate::test_support::RecordingRunner;

    fn plan_in(tmp: &TempDir, options: &[BuildOption]) -> InstallPlan {
        let recipe = Recipe::gcc48();
        let options: OptionSet = options.iter().copied().collect();
        let source = tmp.path().join("gcc-4.8.0");
        std::fs::create_dir_all(&source).unwrap();
        InstallPlan::new(&PlanRequest {
            recipe: &recipe,
            options: &options,
            prefix: &tmp.path().join("keg"),
            source_dir: &source,
            resolver: &StaticResolver::uniform("/opt/x"),
            host: &StaticHost::default(),
            make: "make",
            jobs: None,
        })
        .unwrap()
    }

    #[test]
    fn test_runs_steps_in_order_and_prunes_man7() {
        let tmp = TempDir::new().unwrap();
        let plan = plan_in(&tmp, &[BuildOption::EnableCxx]);

        let man7 = plan.layout.man7();
        std::fs::create_dir_all(&man7).unwrap();
        std::fs::write(man7.join("gpl.7"), "").unwrap();
        let man1 = plan.layout.share().join("man/man1");
        std::fs::create_dir_all(&man1).unwrap();

        let shell = Shell::quiet();
        let mut executor = PlanExecutor::new(RecordingRunner::new(), &shell);
        let report = executor.execute(&plan).unwrap();

        assert_eq!(report.steps, [StepKind::Configure, StepKind::Bootstrap, StepKind::Install]);
        assert_eq!(report.removed, vec![man7.clone()]);
        assert!(!man7.exists());
        assert!(man1.exists());

        let runner = executor.into_runner();
        let commands = runner.commands();
        assert_eq!(commands.len(), 3);
        assert!(commands[0].starts_with("../configure --enable-languages=c,c++ "));
        assert_eq!(commands[1], "make bootstrap");
        assert_eq!(commands[2], "make install");
        for call in runner.calls() {
            assert_eq!(call.cwd.as_deref(), Some(plan.build_dir.as_path()));
            assert!(call.env_remove.contains(&"LD".to_string()));
        }
    }

    #[test]
    fn test_failure_stops_remaining_steps() {
        let tmp = TempDir::new().unwrap();
        let plan = plan_in(&tmp, &[]);

        let shell = Shell::quiet();
        let runner = RecordingRunner::new().fail_on("make bootstrap", 2);
        let mut executor = PlanExecutor::new(runner, &shell);
        let err = executor.execute(&plan).unwrap_err();

        match err {
            BuildError::StepFailed { step, code, .. } => {
                assert_eq!(step, StepKind::Bootstrap);
                assert_eq!(code, Some(2));
            }
            other => panic!("unexpected error: {other}"),
        }

        let runner = executor.into_runner();
        assert_eq!(runner.commands().len(), 2);
        assert!(!runner.commands().iter().any(|c| c == "make install"));
    }

    #[test]
    fn test_build_dir_is_recreated() {
        let tmp = TempDir::new().unwrap();
        let plan = plan_in(&tmp, &[]);

        std::fs::create_dir_all(&plan.build_dir).unwrap();
        let stale = plan.build_dir.join("config.cache");
        std::fs::write(&stale, "stale").unwrap();

        let shell = Shell::quiet();
        PlanExecutor::new(RecordingRunner::new(), &shell)
            .execute(&plan)
            .unwrap();

        assert!(plan.build_dir.is_dir());
        assert!(!stale.exists());
    }

    #[test]
    fn test_spawn_error_is_reported() {
        let tmp = TempDir::new().unwrap();
        let plan = plan_in(&tmp, &[]);

        let shell = Shell::quiet();
        let runner = RecordingRunner::new().spawn_error_on("../configure");
        let err = PlanExecutor::new(runner, &shell).execute(&plan).unwrap_err();
        assert!(matches!(err, BuildError::Spawn { step: StepKind::Configure, .. }));
    }

    #[test]
    fn test_build_dir_error_keeps_io_cause() {
        let tmp = TempDir::new().unwrap();
        let plan = plan_in(&tmp, &[]);
        std::fs::write(&plan.build_dir, "not a directory").unwrap();

        let shell = Shell::quiet();
        let mut executor = PlanExecutor::new(RecordingRunner::new(), &shell);
        let err = executor.execute(&plan).unwrap_err();

        assert!(matches!(&err, BuildError::BuildDir { path, .. } if path == &plan.build_dir));
        let cause = std::error::Error::source(&err).expect("io cause");
        assert!(cause.downcast_ref::<std::io::Error>().is_some());
        assert!(executor.into_runner().commands().is_empty());
    }

    #[test]
    fn test_cleanup_error_keeps_io_cause() {
        let tmp = TempDir::new().unwrap();
        let plan = plan_in(&tmp, &[]);
        let man7 = plan.layout.man7();
        std::fs::create_dir_all(man7.parent().unwrap()).unwrap();
        std::fs::write(&man7, "not a directory").unwrap();

        let shell = Shell::quiet();
        let err = PlanExecutor::new(RecordingRunner::new(), &shell)
            .execute(&plan)
            .unwrap_err();

        assert!(matches!(&err, BuildError::Cleanup { path, .. } if path == &man7));
        assert!(err.to_string().starts_with("failed to remove "));
        let cause = std::error::Error::source(&err).expect("io cause");
        assert!(cause.downcast_ref::<std::io::Error>().is_some());
    }
}
