//! Saved preferences: server URL, mods directory, game version.

use modsync_schema::PlatformVersion;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::paths::config_path;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine config directory. Set MODSYNC_HOME to override.")]
    NoHome,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid preferences in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub server_url: String,
    pub mods_directory: String,
    pub game_version: PlatformVersion,
}

impl Preferences {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path().ok_or(ConfigError::NoHome)?)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_path().ok_or(ConfigError::NoHome)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No preferences at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write pretty JSON next to `path` and rename it into place.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let body = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, body).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;

        tracing::debug!("Saved preferences to {}", path.display());
        Ok(())
    }

    /// The configured mods directory, if one was set.
    pub fn mods_dir(&self) -> Option<PathBuf> {
        (!self.mods_directory.is_empty()).then(|| PathBuf::from(&self.mods_directory))
    }

    /// The configured server URL, if one was set.
    pub fn server(&self) -> Option<&str> {
        (!self.server_url.is_empty()).then_some(self.server_url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let prefs = Preferences::load_from(&tmp.path().join("config.json")).unwrap();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.server(), None);
        assert_eq!(prefs.mods_dir(), None);
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/config.json");
        let prefs = Preferences {
            server_url: "http://127.0.0.1:8080/mods.html".to_string(),
            mods_directory: "/games/mods".to_string(),
            game_version: PlatformVersion::Fs25,
        };

        prefs.save_to(&path).unwrap();
        assert_eq!(Preferences::load_from(&path).unwrap(), prefs);
        assert!(!tmp.path().join("nested/config.json.tmp").exists());
    }

    #[test]
    fn test_keys_are_camel_case() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"serverUrl":"http://h/mods.html","gameVersion":"FS22"}"#,
        )
        .unwrap();

        let prefs = Preferences::load_from(&path).unwrap();
        assert_eq!(prefs.server(), Some("http://h/mods.html"));
        assert_eq!(prefs.game_version, PlatformVersion::Fs22);
        assert_eq!(prefs.mods_directory, "");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            Preferences::load_from(&path),
            Err(ConfigError::Json { .. })
        ));
    }
}
