//! Configuration for Parade.
//!
//! ## config.kdl - dashboard preferences
//!
//! Located at:
//! - `$PARADE_CONFIG_DIR/config.kdl` when the variable is set
//! - otherwise `~/.config/parade/config.kdl` (platform config dir)
//!
//! Contains:
//! - `blocking-types` - dependency types that gate work
//! - `user` - operator identity for the focus list
//! - `output-format` - "json" or "human"
//! - `focus-ready-cap` / `focus-blocked-cap` - focus list caps
//! - `issues` - issue snapshot path
//!
//! ## Precedence
//!
//! CLI flag > environment variable > config.kdl > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, DEFAULT_ISSUES_PATH, ISSUES_ENV, Resolved, ResolvedConfig, USER_ENV, ValueSource,
    resolve_config, resolve_with,
};
pub use schema::{OutputFormat, ParadeConfig};

use kdl::KdlDocument;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "PARADE_CONFIG_DIR";

/// File name of the config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.kdl";

/// Directory holding config.kdl.
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::config_dir()
        .map(|dir| dir.join("parade"))
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))
}

/// Full path of config.kdl.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load and validate config.kdl from the default location.
pub fn load_config() -> Result<ParadeConfig> {
    load_config_from(&config_path()?)
}

/// Load and validate a config file.
///
/// Returns an empty config if the file doesn't exist.
pub fn load_config_from(path: &Path) -> Result<ParadeConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(ParadeConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    let doc: KdlDocument = content
        .parse()
        .map_err(|e| Error::Config(format!("Failed to parse KDL in {}: {}", path.display(), e)))?;

    let config = ParadeConfig::from_kdl(&doc);
    config
        .validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, ParadeConfig::default());
    }

    #[test]
    fn test_load_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "user \"unterminated\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Failed to parse KDL"));
    }

    #[test]
    fn test_load_invalid_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "focus-ready-cap 0\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("focus-ready-cap"));
    }

    #[test]
    #[serial]
    fn test_config_dir_env_override() {
        let dir = TempDir::new().unwrap();
        // SAFETY: serialized with every other test that mutates the environment
        unsafe {
            std::env::set_var(CONFIG_DIR_ENV, dir.path());
        }
        let path = config_path().unwrap();
        unsafe {
            std::env::remove_var(CONFIG_DIR_ENV);
        }
        assert_eq!(path, dir.path().join(CONFIG_FILE_NAME));
    }
}
