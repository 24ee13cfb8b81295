use dirs::{config_dir, home_dir};
use modsync_schema::PlatformVersion;
use std::path::PathBuf;

/// Returns the modsync configuration directory, or None if it cannot be resolved.
///
/// `MODSYNC_HOME` overrides the platform config directory.
pub fn try_modsync_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("MODSYNC_HOME") {
        return Some(PathBuf::from(val));
    }
    config_dir().map(|c| c.join("modsync"))
}

/// Preferences file: <modsync home>/config.json
pub fn config_path() -> Option<PathBuf> {
    try_modsync_home().map(|h| h.join("config.json"))
}

/// Where the game looks for mods: ~/Documents/My Games/<game>/mods
pub fn default_mods_dir(platform: PlatformVersion) -> Option<PathBuf> {
    home_dir().map(|h| {
        h.join("Documents")
            .join("My Games")
            .join(platform.game_dir_name())
            .join("mods")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mods_dir_per_platform() {
        let Some(fs22) = default_mods_dir(PlatformVersion::Fs22) else {
            return;
        };
        assert!(fs22.ends_with("Documents/My Games/FarmingSimulator2022/mods"));

        let fs25 = default_mods_dir(PlatformVersion::Fs25).unwrap();
        assert!(fs25.ends_with("My Games/FarmingSimulator2025/mods"));
    }
}
