//! High-level operations.
//!
//! This module contains the implementation of gccforge commands.

pub mod doctor;
pub mod fetch;
pub mod install;

pub use doctor::{doctor, format_report, CheckResult, DoctorOptions, DoctorReport};
pub use fetch::{fetch, unpack_archive, FetchOptions, FetchResult};
pub use install::{install, plan_install, InstallOptions};
