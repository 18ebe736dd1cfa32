use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Config file picked up from the working directory when `--config` is absent.
pub const CONFIG_TOML: &str = "vuload.toml";
/// JSON fallback looked up after [`CONFIG_TOML`].
pub const CONFIG_JSON: &str = "vuload.json";

/// Loads the explicit `--config` file, or the first of [`CONFIG_TOML`] and
/// [`CONFIG_JSON`] found in the working directory.
///
/// # Errors
///
/// Returns an error when the config file cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> AppResult<Option<ConfigFile>> {
    let candidate = path.map_or_else(
        || {
            [CONFIG_TOML, CONFIG_JSON]
                .into_iter()
                .map(PathBuf::from)
                .find(|default_path| default_path.exists())
        },
        |explicit| Some(PathBuf::from(explicit)),
    );
    candidate
        .map(|config_path| load_config_file(&config_path))
        .transpose()
}

enum ConfigFormat {
    Toml,
    Json,
}

fn detect_format(path: &Path) -> Result<ConfigFormat, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(ConfigFormat::Toml),
        Some("json") => Ok(ConfigFormat::Json),
        Some(ext) => Err(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        }),
        None => Err(ConfigError::MissingExtension),
    }
}

pub(crate) fn load_config_file(path: &Path) -> AppResult<ConfigFile> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path).map_err(|err| ConfigError::ReadConfig {
        path: path.to_path_buf(),
        source: err,
    })?;
    let parsed = match format {
        ConfigFormat::Toml => toml::from_str(&content).map_err(|err| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source: err,
        }),
        ConfigFormat::Json => {
            serde_json::from_str(&content).map_err(|err| ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        }
    };
    let config = parsed.map_err(AppError::config)?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}
