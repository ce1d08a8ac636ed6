//! gccforge - build and install GCC 4.8 from source
//!
//! This crate turns a set of build options into the exact `configure`
//! invocation, environment and step sequence for a GCC bootstrap, and
//! runs it.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for gccforge unit tests.
///
/// Only compiled for tests. Provides a recording command runner and
/// on-disk fixtures for source trees and archives.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildError, InstallPlan};
pub use crate::core::{
    dependency::Dependency, language::LanguageSet, options::BuildOption, options::OptionSet,
    recipe::Recipe,
};
pub use util::context::GlobalContext;
