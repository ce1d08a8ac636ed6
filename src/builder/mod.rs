//! Compiler build driver.
//!
//! This module turns options into a configure invocation and runs the
//! configure / bootstrap / install sequence.

pub mod configure;
pub mod env;
pub mod executor;
pub mod layout;
pub mod plan;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::dependency::DependencyError;

pub use configure::{configure_args, ArgumentList, ConfigureInputs};
pub use env::BuildEnvironment;
pub use executor::{CommandRunner, InstallReport, PlanExecutor, StepStatus, SystemRunner};
pub use layout::InstallLayout;
pub use plan::{BuildStep, InstallPlan, PlanRequest, StepKind};

/// Error while planning or running a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    #[error("command-line tools are not installed and no SDK path could be found")]
    MissingSdk,

    #[error("failed to prepare build directory {}", .path.display())]
    BuildDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start {step} step `{command}`")]
    Spawn {
        step: StepKind,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} step `{command}` failed with exit code {}", display_code(.code))]
    StepFailed {
        step: StepKind,
        command: String,
        code: Option<i32>,
    },

    #[error("failed to remove {}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}
