//! Core data structures for gccforge.
//!
//! This module contains the foundational types:
//! - Build options and the language set derived from them
//! - Dependencies and the resolver interface
//! - The recipe and its version
//! - Host probes

pub mod dependency;
pub mod host;
pub mod language;
pub mod options;
pub mod recipe;
pub mod version;

pub use dependency::{
    ChainResolver, Dependency, DependencyError, DependencyResolver, OptPrefixResolver,
    ResolvedDependencies, StaticResolver,
};
pub use host::{HostProbe, StaticHost, SystemHost};
pub use language::{Language, LanguageSet};
pub use options::{BuildOption, OptionSet, UnknownOptionError};
pub use recipe::{Checksum, ChecksumKind, Recipe};
pub use version::{Version, VersionError};
