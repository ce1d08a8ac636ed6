//! Build options.
//!
//! Options are plain on/off switches selected once, before anything is
//! resolved. An [`OptionSet`] is never mutated after construction.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named boolean build option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildOption {
    EnableCxx,
    EnableFortran,
    EnableJava,
    EnableObjc,
    EnableObjcxx,
    EnableAllLanguages,
    EnableNls,
    EnableProfiledBuild,
    EnableMultilib,
}

impl BuildOption {
    /// Every option, in declaration order.
    pub const ALL: [BuildOption; 9] = [
        BuildOption::EnableCxx,
        BuildOption::EnableFortran,
        BuildOption::EnableJava,
        BuildOption::EnableObjc,
        BuildOption::EnableObjcxx,
        BuildOption::EnableAllLanguages,
        BuildOption::EnableNls,
        BuildOption::EnableProfiledBuild,
        BuildOption::EnableMultilib,
    ];

    /// Get the option name as written on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildOption::EnableCxx => "enable-cxx",
            BuildOption::EnableFortran => "enable-fortran",
            BuildOption::EnableJava => "enable-java",
            BuildOption::EnableObjc => "enable-objc",
            BuildOption::EnableObjcxx => "enable-objcxx",
            BuildOption::EnableAllLanguages => "enable-all-languages",
            BuildOption::EnableNls => "enable-nls",
            BuildOption::EnableProfiledBuild => "enable-profiled-build",
            BuildOption::EnableMultilib => "enable-multilib",
        }
    }

    /// Human-readable description shown by `gccforge options`.
    pub fn description(&self) -> &'static str {
        match self {
            BuildOption::EnableCxx => "Build the g++ compiler",
            BuildOption::EnableFortran => "Build the gfortran compiler",
            BuildOption::EnableJava => "Build the gcj compiler",
            BuildOption::EnableObjc => "Enable Objective-C language support",
            BuildOption::EnableObjcxx => "Enable Objective-C++ language support",
            BuildOption::EnableAllLanguages => "Enable all compilers and languages, except Ada",
            BuildOption::EnableNls => "Build with native language support (localization)",
            BuildOption::EnableProfiledBuild => {
                "Make use of profile guided optimization when bootstrapping GCC"
            }
            BuildOption::EnableMultilib => "Build with multilib support",
        }
    }
}

impl fmt::Display for BuildOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown option name.
#[derive(Debug, Clone, Error)]
#[error("unknown build option `{0}` (run `gccforge options` to list them)")]
pub struct UnknownOptionError(pub String);

impl FromStr for BuildOption {
    type Err = UnknownOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches("--");
        BuildOption::ALL
            .iter()
            .copied()
            .find(|opt| opt.as_str() == name)
            .ok_or_else(|| UnknownOptionError(s.to_string()))
    }
}

/// The set of options selected for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet {
    selected: BTreeSet<BuildOption>,
}

impl OptionSet {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an option is selected.
    pub fn contains(&self, option: BuildOption) -> bool {
        self.selected.contains(&option)
    }

    /// Whether the ecj jar is needed (Java requested directly or via all languages).
    pub fn wants_java(&self) -> bool {
        self.contains(BuildOption::EnableJava) || self.contains(BuildOption::EnableAllLanguages)
    }

    /// Iterate over selected options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = BuildOption> + '_ {
        self.selected.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Parse option names into a set, failing on the first unknown name.
    pub fn parse<I, S>(names: I) -> Result<Self, UnknownOptionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| name.as_ref().parse::<BuildOption>())
            .collect()
    }
}

impl FromIterator<BuildOption> for OptionSet {
    fn from_iter<T: IntoIterator<Item = BuildOption>>(iter: T) -> Self {
        OptionSet {
            selected: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.selected.is_empty() {
            return f.write_str("(none)");
        }
        let names: Vec<&str> = self.selected.iter().map(|o| o.as_str()).collect();
        f.write_str(&names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option_names() {
        assert_eq!("enable-cxx".parse::<BuildOption>().unwrap(), BuildOption::EnableCxx);
        assert_eq!(
            "--enable-all-languages".parse::<BuildOption>().unwrap(),
            BuildOption::EnableAllLanguages
        );
        assert!("enable-ada".parse::<BuildOption>().is_err());
    }

    #[test]
    fn test_option_names_round_trip_through_display() {
        for opt in BuildOption::ALL {
            assert_eq!(opt.to_string().parse::<BuildOption>().unwrap(), opt);
        }
    }

    #[test]
    fn test_wants_java() {
        assert!(!OptionSet::new().wants_java());
        assert!(OptionSet::from_iter([BuildOption::EnableJava]).wants_java());
        assert!(OptionSet::from_iter([BuildOption::EnableAllLanguages]).wants_java());
        assert!(!OptionSet::from_iter([BuildOption::EnableCxx]).wants_java());
    }

    #[test]
    fn test_parse_set_rejects_unknown() {
        let err = OptionSet::parse(["enable-cxx", "enable-go"]).unwrap_err();
        assert!(err.to_string().contains("enable-go"));

        let set = OptionSet::parse(["enable-nls", "enable-nls"]).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_serde_kebab_case() {
        let set = OptionSet::from_iter([BuildOption::EnableProfiledBuild]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["enable-profiled-build"]"#);
    }
}
