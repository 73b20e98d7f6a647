//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::BuildConfig;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "incbuild.toml";

/// Loads and validates the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<BuildConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<BuildConfig, ConfigError> {
    let config: BuildConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Finds the configuration for a run.
///
/// An explicit path must exist. Without one, `incbuild.toml` in `work_dir` is
/// used when present, and the built-in defaults otherwise.
pub fn discover_config(
    work_dir: &Path,
    explicit: Option<&Path>,
) -> Result<BuildConfig, ConfigError> {
    if let Some(path) = explicit {
        tracing::debug!(path = %path.display(), "loading configuration");
        return load_config(path);
    }

    let candidate = work_dir.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        tracing::debug!(path = %candidate.display(), "loading configuration");
        load_config(&candidate)
    } else {
        tracing::debug!("no configuration file, using defaults");
        Ok(BuildConfig::default())
    }
}

/// Validates that required values are present and consistent.
pub(crate) fn validate_config(config: &BuildConfig) -> Result<(), ConfigError> {
    if config.toolchain.compiler.trim().is_empty() {
        return Err(ConfigError::MissingField("toolchain.compiler".to_string()));
    }
    if config.toolchain.archiver.trim().is_empty() {
        return Err(ConfigError::MissingField("toolchain.archiver".to_string()));
    }
    check_extension("sources.extension", &config.sources.extension)?;
    check_extension("sources.object_extension", &config.sources.object_extension)?;
    if config.sources.extension == config.sources.object_extension {
        return Err(ConfigError::ValidationError(
            "sources.extension and sources.object_extension must differ".to_string(),
        ));
    }
    if config.cache.file.as_os_str().is_empty() {
        return Err(ConfigError::MissingField("cache.file".to_string()));
    }
    Ok(())
}

fn check_extension(field: &str, ext: &str) -> Result<(), ConfigError> {
    if ext.is_empty() {
        return Err(ConfigError::MissingField(field.to_string()));
    }
    if ext.starts_with('.') || ext.contains(&['/', '\\'][..]) {
        return Err(ConfigError::ValidationError(format!(
            "{field} must be a bare extension like \"cpp\", got \"{ext}\""
        )));
    }
    Ok(())
}
