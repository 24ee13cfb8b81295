//! Saved preferences.

use anyhow::{Context, Result};
use modsync_core::{Preferences, config_path};
use modsync_schema::PlatformVersion;
use std::path::PathBuf;

pub fn show() -> Result<()> {
    let prefs = Preferences::load().context("Failed to load preferences")?;
    let or_unset = |s: &str| if s.is_empty() { "(not set)".to_string() } else { s.to_string() };

    println!("{:<10}{}", "Server:", or_unset(&prefs.server_url));
    println!("{:<10}{}", "Mods:", or_unset(&prefs.mods_directory));
    println!("{:<10}{}", "Game:", prefs.game_version);
    Ok(())
}

pub fn set(
    server: Option<String>,
    dir: Option<PathBuf>,
    game: Option<PlatformVersion>,
    dry_run: bool,
) -> Result<()> {
    let mut prefs = Preferences::load().context("Failed to load preferences")?;

    if let Some(server) = server {
        prefs.server_url = server;
    }
    if let Some(dir) = dir {
        prefs.mods_directory = dir.to_string_lossy().into_owned();
    }
    if let Some(game) = game {
        prefs.game_version = game;
    }

    if dry_run {
        println!("Would save:");
        println!("{:<10}{}", "Server:", prefs.server_url);
        println!("{:<10}{}", "Mods:", prefs.mods_directory);
        println!("{:<10}{}", "Game:", prefs.game_version);
        return Ok(());
    }

    let path = prefs.save().context("Failed to save preferences")?;
    println!("Saved {}", path.display());
    Ok(())
}

pub fn path() -> Result<()> {
    let path = config_path()
        .context("Could not determine config directory. Set MODSYNC_HOME to override.")?;
    println!("{}", path.display());
    Ok(())
}
