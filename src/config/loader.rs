use std::path::Path;

use crate::args::DEFAULT_CONFIG_FILES;
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    fn detect(path: &Path) -> AppResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            Some(ext) => Err(AppError::config(ConfigError::UnsupportedExtension {
                ext: ext.to_owned(),
            })),
            None => Err(AppError::config(ConfigError::MissingExtension)),
        }
    }
}

/// Loads the config file named on the command line, or the first default
/// file present in the working directory. `None` when there is neither.
///
/// # Errors
///
/// Returns an error when the config file cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> AppResult<Option<ConfigFile>> {
    if let Some(path) = path {
        return load_config_file(Path::new(path)).map(Some);
    }

    DEFAULT_CONFIG_FILES
        .iter()
        .map(Path::new)
        .find(|candidate| candidate.exists())
        .map(load_config_file)
        .transpose()
}

/// Reads and parses a single config file, picking the format by extension.
///
/// # Errors
///
/// Returns an error when the file cannot be read, has an unsupported
/// extension, or fails to parse.
pub fn load_config_file(path: &Path) -> AppResult<ConfigFile> {
    let format = ConfigFormat::detect(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })
    })?;

    match format {
        ConfigFormat::Toml => toml::from_str(&content).map_err(|source| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source,
            })
        }),
        ConfigFormat::Json => serde_json::from_str(&content).map_err(|source| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source,
            })
        }),
    }
}
