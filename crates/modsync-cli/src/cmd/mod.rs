//! Command implementations.

pub mod config;
pub mod status;
pub mod sync;
pub mod validate;

use anyhow::{Context, Result, bail};
use modsync_core::{Preferences, default_mods_dir};
use std::path::PathBuf;

use crate::TargetArgs;

/// Fully resolved server and mods directory for one run.
#[derive(Debug, Clone)]
pub struct Target {
    pub server_url: String,
    pub mods_dir: PathBuf,
}

impl TargetArgs {
    /// Fill missing flags from preferences, then from the game's default folder.
    pub fn resolve(self) -> Result<Target> {
        let prefs = Preferences::load().context("Failed to load preferences")?;
        self.resolve_with(&prefs)
    }

    pub fn resolve_with(self, prefs: &Preferences) -> Result<Target> {
        let Some(server_url) = self.server.or_else(|| prefs.server().map(str::to_string)) else {
            bail!(
                "No server URL. Pass --server, set MODSYNC_SERVER_URL, or run `modsync config set --server <URL>`."
            );
        };

        let mods_dir = self
            .dir
            .or_else(|| prefs.mods_dir())
            .or_else(|| default_mods_dir(prefs.game_version))
            .context("No mods directory. Pass --dir or run `modsync config set --dir <PATH>`.")?;

        tracing::debug!("Target: {server_url} -> {}", mods_dir.display());
        Ok(Target {
            server_url,
            mods_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(server: Option<&str>, dir: Option<&str>) -> TargetArgs {
        TargetArgs {
            server: server.map(str::to_string),
            dir: dir.map(PathBuf::from),
        }
    }

    #[test]
    fn test_flags_win_over_preferences() {
        let prefs = Preferences {
            server_url: "http://saved/mods.html".to_string(),
            mods_directory: "/saved/mods".to_string(),
            ..Default::default()
        };
        let target = args(Some("http://flag/mods.html"), Some("/flag/mods"))
            .resolve_with(&prefs)
            .unwrap();
        assert_eq!(target.server_url, "http://flag/mods.html");
        assert_eq!(target.mods_dir, PathBuf::from("/flag/mods"));

        let target = args(None, None).resolve_with(&prefs).unwrap();
        assert_eq!(target.server_url, "http://saved/mods.html");
        assert_eq!(target.mods_dir, PathBuf::from("/saved/mods"));
    }

    #[test]
    fn test_missing_server_is_an_error() {
        let err = args(None, Some("/mods"))
            .resolve_with(&Preferences::default())
            .unwrap_err();
        assert!(err.to_string().contains("No server URL"));
    }
}
