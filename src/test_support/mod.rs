//! Test utilities and mocks for gccforge unit tests.
//!
//! The install pipeline spawns `configure` and `make`; [`RecordingRunner`]
//! stands in for the process runner so tests can see which commands ran,
//! where, and with which environment.

pub mod fixtures;

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::builder::executor::{CommandRunner, StepStatus};
use crate::util::process::ProcessBuilder;

pub use fixtures::*;

/// Pattern for matching commands in [`RecordingRunner`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on the full command string.
    Exact(String),
    /// Match if the command starts with a prefix.
    StartsWith(String),
}

impl CommandPattern {
    fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s.as_str()),
        }
    }
}

/// One command seen by the runner.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub env_remove: Vec<String>,
    pub command: String,
}

#[derive(Debug, Clone)]
enum Outcome {
    Exit(i32),
    SpawnError,
}

/// Command runner that records calls instead of spawning processes.
///
/// Every command succeeds unless a `fail_on`/`spawn_error_on` pattern matches.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    outcomes: Vec<(CommandPattern, Outcome)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit with `code` when the command string equals `cmd`.
    pub fn fail_on(mut self, cmd: &str, code: i32) -> Self {
        self.outcomes
            .push((CommandPattern::Exact(cmd.to_string()), Outcome::Exit(code)));
        self
    }

    /// Fail to spawn any command starting with `prefix`.
    pub fn spawn_error_on(mut self, prefix: &str) -> Self {
        self.outcomes
            .push((CommandPattern::StartsWith(prefix.to_string()), Outcome::SpawnError));
        self
    }

    /// Recorded calls, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Handle to the call log that outlives the runner.
    pub fn shared_calls(&self) -> Arc<Mutex<Vec<RecordedCall>>> {
        Arc::clone(&self.calls)
    }

    /// Display strings of the recorded commands.
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, cmd: &ProcessBuilder) -> io::Result<StepStatus> {
        let command = cmd.display_command();
        self.calls.lock().unwrap().push(RecordedCall {
            program: cmd.get_program().to_path_buf(),
            args: cmd.get_args().to_vec(),
            cwd: cmd.get_cwd().map(|p| p.to_path_buf()),
            env: cmd.get_env().clone(),
            env_remove: cmd.get_env_remove().to_vec(),
            command: command.clone(),
        });

        let outcome = self
            .outcomes
            .iter()
            .find(|(pattern, _)| pattern.matches(&command))
            .map(|(_, outcome)| outcome.clone());

        match outcome {
            Some(Outcome::Exit(code)) => Ok(StepStatus::failure(code)),
            Some(Outcome::SpawnError) => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: not found", cmd.get_program().display()),
            )),
            None => Ok(StepStatus::success()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_runner() {
        let mut runner = RecordingRunner::new().fail_on("make install", 3);

        let ok = ProcessBuilder::new("make").arg("bootstrap").cwd("/build");
        assert!(runner.run(&ok).unwrap().success);

        let bad = ProcessBuilder::new("make").arg("install");
        assert_eq!(runner.run(&bad).unwrap(), StepStatus::failure(3));

        assert_eq!(runner.commands(), ["make bootstrap", "make install"]);
        assert_eq!(runner.calls()[0].cwd, Some(PathBuf::from("/build")));
    }
}
