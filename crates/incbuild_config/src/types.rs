//! Configuration types deserialized from `incbuild.toml`.

use incbuild_common::DetectionPolicy;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// The top-level configuration parsed from `incbuild.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// External compiler and archiver programs.
    pub toolchain: ToolchainConfig,
    /// Which files in the source directory are compiled.
    pub sources: SourcesConfig,
    /// Record file location and change-detection policy.
    pub cache: CacheConfig,
    /// Archive maintenance settings.
    pub archive: ArchiveConfig,
}

/// External programs invoked by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Compiler program, looked up on `PATH` unless it contains a separator.
    pub compiler: String,
    /// Archiver program.
    pub archiver: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "g++".to_string(),
            archiver: "ar".to_string(),
        }
    }
}

/// Source selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    /// Extension of compilable files, without the leading dot.
    pub extension: String,
    /// Extension given to object files, without the leading dot.
    pub object_extension: String,
    /// File names skipped during the scan (the program's own entry point).
    ///
    /// Accepts a single string or a list.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub exclude: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            extension: "cpp".to_string(),
            object_extension: "o".to_string(),
            exclude: vec!["main.cpp".to_string()],
        }
    }
}

/// Record file settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Record file path, relative to the working directory.
    pub file: PathBuf,
    /// Change-detection policy.
    pub detection: DetectionPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(".last_sizes.txt"),
            detection: DetectionPolicy::Size,
        }
    }
}

/// Archive maintenance settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Remove archive members whose source no longer exists.
    pub prune: bool,
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `exclude = "main.cpp"` as well as `exclude = ["main.cpp", "demo.cpp"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn defaults_match_classic_layout() {
        let config = BuildConfig::default();
        assert_eq!(config.toolchain.compiler, "g++");
        assert_eq!(config.toolchain.archiver, "ar");
        assert_eq!(config.sources.extension, "cpp");
        assert_eq!(config.sources.object_extension, "o");
        assert_eq!(config.sources.exclude, vec!["main.cpp"]);
        assert_eq!(config.cache.file, PathBuf::from(".last_sizes.txt"));
        assert_eq!(config.cache.detection, DetectionPolicy::Size);
        assert!(!config.archive.prune);
    }

    #[test]
    fn exclude_accepts_single_string() {
        let config = load_config_from_str("[sources]\nexclude = \"app.cpp\"\n").unwrap();
        assert_eq!(config.sources.exclude, vec!["app.cpp"]);
    }

    #[test]
    fn exclude_accepts_list() {
        let config =
            load_config_from_str("[sources]\nexclude = [\"app.cpp\", \"demo.cpp\"]\n").unwrap();
        assert_eq!(config.sources.exclude, vec!["app.cpp", "demo.cpp"]);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = load_config_from_str("[toolchain]\ncompiler = \"clang++\"\n").unwrap();
        assert_eq!(config.toolchain.compiler, "clang++");
        assert_eq!(config.toolchain.archiver, "ar");
    }
}
