//! Parsing and validation of `incbuild.toml` configuration files.
//!
//! The configuration names the external compiler and archiver, the source and
//! object extensions, the entry-point files to leave out, where the record
//! file lives, and the change-detection and pruning policies. Every section
//! is optional; an absent file yields [`BuildConfig::default`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod overrides;
pub mod types;

pub use error::ConfigError;
pub use loader::{discover_config, load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use overrides::ConfigOverrides;
pub use types::*;
