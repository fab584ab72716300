//! Configuration file handling for ~/.config/graze/config.toml.
//!
//! The file holds the database location and the currently logged-in user.
//! A missing file yields `Config::default()`; `login` and `register` write
//! the file back.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ============================================================================
// Configuration
// ============================================================================

/// Persisted process configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be present.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Database file path. Defaults to `graze.db` beside the config file.
    pub db_path: Option<String>,

    /// Name of the logged-in user. Set by `login`/`register`; commands that
    /// need a user resolve it into an explicit record at dispatch time.
    pub current_username: Option<String>,
}

/// The directory holding config.toml and the default database
/// (~/.config/graze/).
pub fn config_dir() -> Result<PathBuf, std::env::VarError> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(".config").join("graze"))
}

impl Config {
    /// Load configuration from a TOML file. Missing file → defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Write the configuration back to disk.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Record `name` as the logged-in user and persist immediately.
    pub fn set_user(&mut self, name: &str, path: &Path) -> Result<(), ConfigError> {
        self.current_username = Some(name.to_string());
        self.save(path)
    }

    /// The database path, falling back to `graze.db` in `dir`.
    pub fn resolve_db_path(&self, dir: &Path) -> String {
        match &self.db_path {
            Some(path) => path.clone(),
            None => dir.join("graze.db").to_string_lossy().into_owned(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.db_path.is_none());
        assert!(config.current_username.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/graze_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert!(config.current_username.is_none());
    }

    #[test]
    fn test_set_user_round_trip() {
        let dir = std::env::temp_dir().join("graze_config_test_roundtrip");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let mut config = Config::default();
        config.set_user("alice", &path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.current_username.as_deref(), Some("alice"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = std::env::temp_dir().join("graze_config_test_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "current_username = \"bob\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.current_username.as_deref(), Some("bob"));
        assert!(config.db_path.is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("graze_config_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resolve_db_path_default() {
        let config = Config::default();
        let resolved = config.resolve_db_path(Path::new("/home/alice/.config/graze"));
        assert_eq!(resolved, "/home/alice/.config/graze/graze.db");
    }

    #[test]
    fn test_resolve_db_path_explicit() {
        let config = Config {
            db_path: Some("/data/feeds.db".to_string()),
            current_username: None,
        };
        let resolved = config.resolve_db_path(Path::new("/ignored"));
        assert_eq!(resolved, "/data/feeds.db");
    }
}
