//! Compiler front-end languages and the language set for a build.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::options::{BuildOption, OptionSet};

/// A language front end that can be passed to `--enable-languages`.
///
/// Ada is deliberately absent: building it needs an existing GNAT to
/// bootstrap from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    /// C language (always built)
    #[serde(rename = "c")]
    C,
    /// C++ language
    #[serde(rename = "c++", alias = "cxx", alias = "cpp")]
    Cxx,
    #[serde(rename = "fortran")]
    Fortran,
    #[serde(rename = "java")]
    Java,
    #[serde(rename = "objc")]
    ObjC,
    #[serde(rename = "obj-c++", alias = "objcxx")]
    ObjCxx,
}

impl Language {
    /// Every language, in `--enable-languages` order.
    pub const ALL: [Language; 6] = [
        Language::C,
        Language::Cxx,
        Language::Fortran,
        Language::Java,
        Language::ObjC,
        Language::ObjCxx,
    ];

    /// Get the language name as configure expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
            Language::Fortran => "fortran",
            Language::Java => "java",
            Language::ObjC => "objc",
            Language::ObjCxx => "obj-c++",
        }
    }

    /// The option that turns this language on, if it is optional.
    pub fn option(&self) -> Option<BuildOption> {
        match self {
            Language::C => None,
            Language::Cxx => Some(BuildOption::EnableCxx),
            Language::Fortran => Some(BuildOption::EnableFortran),
            Language::Java => Some(BuildOption::EnableJava),
            Language::ObjC => Some(BuildOption::EnableObjc),
            Language::ObjCxx => Some(BuildOption::EnableObjcxx),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of languages to build. Always contains C.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageSet(Vec<Language>);

impl LanguageSet {
    /// Compute the language set from the selected options.
    ///
    /// `enable-all-languages` selects every language and supersedes the
    /// individual language options.
    pub fn from_options(options: &OptionSet) -> Self {
        if options.contains(BuildOption::EnableAllLanguages) {
            let explicit: Vec<&str> = Language::ALL
                .iter()
                .filter_map(|lang| lang.option())
                .filter(|opt| options.contains(*opt))
                .map(|opt| opt.as_str())
                .collect();
            if !explicit.is_empty() {
                tracing::warn!(
                    "enable-all-languages overrides {}",
                    explicit.join(", ")
                );
            }
            return LanguageSet(Language::ALL.to_vec());
        }

        let languages = Language::ALL
            .iter()
            .copied()
            .filter(|lang| match lang.option() {
                None => true,
                Some(opt) => options.contains(opt),
            })
            .collect();

        LanguageSet(languages)
    }

    pub fn as_slice(&self) -> &[Language] {
        &self.0
    }

    /// Join into the comma separated value for `--enable-languages`.
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(|lang| lang.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The `--enable-languages=...` configure flag.
    pub fn to_configure_flag(&self) -> String {
        format!("--enable-languages={}", self.joined())
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(options: &[BuildOption]) -> OptionSet {
        options.iter().copied().collect()
    }

    #[test]
    fn test_c_only_by_default() {
        let langs = LanguageSet::from_options(&OptionSet::new());
        assert_eq!(langs.as_slice(), &[Language::C]);
        assert_eq!(langs.to_configure_flag(), "--enable-languages=c");
    }

    #[test]
    fn test_each_language_follows_its_option() {
        for lang in Language::ALL.iter().skip(1) {
            let opt = lang.option().unwrap();
            let langs = LanguageSet::from_options(&set(&[opt]));
            assert_eq!(langs.as_slice(), &[Language::C, *lang]);
        }
    }

    #[test]
    fn test_order_is_fixed_regardless_of_selection_order() {
        let langs = LanguageSet::from_options(&set(&[
            BuildOption::EnableObjcxx,
            BuildOption::EnableFortran,
            BuildOption::EnableCxx,
        ]));
        assert_eq!(langs.joined(), "c,c++,fortran,obj-c++");
    }

    #[test]
    fn test_all_languages_supersedes_individual_options() {
        let all = LanguageSet::from_options(&set(&[BuildOption::EnableAllLanguages]));
        assert_eq!(all.joined(), "c,c++,fortran,java,objc,obj-c++");

        let mixed = LanguageSet::from_options(&set(&[
            BuildOption::EnableAllLanguages,
            BuildOption::EnableCxx,
            BuildOption::EnableNls,
        ]));
        assert_eq!(mixed, all);
    }

    #[test]
    fn test_every_combination_of_language_options() {
        let toggles = [
            BuildOption::EnableCxx,
            BuildOption::EnableFortran,
            BuildOption::EnableJava,
            BuildOption::EnableObjc,
            BuildOption::EnableObjcxx,
            BuildOption::EnableAllLanguages,
        ];

        for mask in 0u32..(1 << toggles.len()) {
            let selected: Vec<BuildOption> = toggles
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, opt)| *opt)
                .collect();
            let langs = LanguageSet::from_options(&set(&selected));

            let expected: Vec<Language> = if selected.contains(&BuildOption::EnableAllLanguages) {
                Language::ALL.to_vec()
            } else {
                Language::ALL
                    .iter()
                    .copied()
                    .filter(|lang| lang.option().map_or(true, |opt| selected.contains(&opt)))
                    .collect()
            };

            assert_eq!(langs.as_slice(), expected.as_slice(), "options: {:?}", selected);
            assert_eq!(langs.as_slice()[0], Language::C);
            assert_eq!(
                langs.to_configure_flag(),
                format!("--enable-languages={}", langs.joined())
            );
        }
    }

    #[test]
    fn test_unrelated_options_do_not_add_languages() {
        let langs = LanguageSet::from_options(&set(&[
            BuildOption::EnableNls,
            BuildOption::EnableMultilib,
            BuildOption::EnableProfiledBuild,
        ]));
        assert_eq!(langs.as_slice(), &[Language::C]);
    }
}
