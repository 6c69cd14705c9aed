//! Configuration file discovery and loading.

use crate::config::schema::SrcpinConfig;
use crate::error::{Result, SrcpinError};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".srcpin.yml";

/// Find the configuration file in `dir`, if there is one.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Load a single config file and parse it into SrcpinConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<SrcpinConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SrcpinError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            SrcpinError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into SrcpinConfig.
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<SrcpinConfig> {
    if content.trim().is_empty() {
        return Ok(SrcpinConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| SrcpinError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config with optional path override.
///
/// An explicit `config_override` must exist. Otherwise `.srcpin.yml` in
/// `working_dir` is used if present, and the built-in defaults if not.
pub fn load_config(working_dir: &Path, config_override: Option<&Path>) -> Result<SrcpinConfig> {
    if let Some(override_path) = config_override {
        return load_config_file(override_path);
    }

    match find_config(working_dir) {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            load_config_file(&path)
        }
        None => Ok(SrcpinConfig::default()),
    }
}
