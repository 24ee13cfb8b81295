//! Catalog, inventory and plan types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

use crate::{ASSET_EXT, UNKNOWN_VERSION};

/// Target game release a catalog was published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlatformVersion {
    /// The older release (`FS22`).
    #[default]
    #[serde(rename = "FS22")]
    Fs22,
    /// The newer release (`FS25`).
    #[serde(rename = "FS25")]
    Fs25,
}

impl PlatformVersion {
    /// The short tag used on the wire and in preferences.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fs22 => "FS22",
            Self::Fs25 => "FS25",
        }
    }

    /// Directory name the game uses under `Documents/My Games`.
    pub fn game_dir_name(self) -> &'static str {
        match self {
            Self::Fs22 => "FarmingSimulator2022",
            Self::Fs25 => "FarmingSimulator2025",
        }
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known platform tag.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown platform version: {0} (expected FS22 or FS25)")]
pub struct UnknownPlatform(pub String);

impl FromStr for PlatformVersion {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FS22" => Ok(Self::Fs22),
            "FS25" => Ok(Self::Fs25),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// One package advertised by the catalog page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Display name (never empty for parsed entries).
    pub name: String,
    /// Opaque version token, compared by equality only.
    pub version: String,
    /// Display author, if the page listed one.
    pub author: Option<String>,
    /// On-disk archive name; unique within one catalog snapshot.
    pub filename: String,
    /// Human-readable size as shown on the page (e.g. `512.5 MB`).
    pub size: String,
    /// Advertised size in bytes, `0` when the size could not be parsed.
    pub size_bytes: u64,
    /// Bundled asset that is never downloaded.
    pub is_package_asset: bool,
    /// Activation flag reported by the server. Informational only.
    pub is_enabled_remotely: bool,
    /// Absolute download URL, empty when the row had no valid link.
    pub download_url: String,
}

impl CatalogEntry {
    /// Whether this entry takes part in syncing at all.
    pub fn is_syncable(&self) -> bool {
        !self.is_package_asset
            && !self.download_url.is_empty()
            && Self::is_plain_filename(&self.filename)
    }

    /// Whether `name` is a single path component that stays inside the directory it is joined to.
    ///
    /// Rejects empty names, `.`/`..`, absolute paths and anything carrying a separator.
    pub fn is_plain_filename(name: &str) -> bool {
        if name.contains(['/', '\\']) {
            return false;
        }
        let mut components = Path::new(name).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
    }

    /// Whether a filename names a bundled asset rather than a downloadable archive.
    pub fn is_asset_filename(filename: &str) -> bool {
        filename.ends_with(ASSET_EXT)
    }
}

/// Metadata read from an installed archive.
///
/// An archive whose descriptor cannot be opened, located or parsed is
/// `Unknown`; a single bad archive never fails a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LocalDescriptor {
    /// Descriptor was read successfully.
    Known {
        /// Version declared by the descriptor.
        version: String,
        /// Author declared by the descriptor, if any.
        author: Option<String>,
    },
    /// Descriptor could not be read.
    Unknown,
}

impl LocalDescriptor {
    /// Version string, or the `"unknown"` sentinel.
    pub fn version(&self) -> &str {
        match self {
            Self::Known { version, .. } => version,
            Self::Unknown => UNKNOWN_VERSION,
        }
    }

    /// Author, if known.
    pub fn author(&self) -> Option<&str> {
        match self {
            Self::Known { author, .. } => author.as_deref(),
            Self::Unknown => None,
        }
    }

    /// Whether the descriptor could not be read.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// A catalog entry annotated with the reconciliation decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlanEntry {
    /// The advertised entry.
    #[serde(flatten)]
    pub entry: CatalogEntry,
    /// Whether the archive must be fetched.
    pub needs_update: bool,
    /// Locally observed version; empty when not installed.
    pub local_version: String,
}

/// The result of joining a catalog against the local inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlan {
    /// Every parsed entry, in catalog order. Ineligible entries are kept for display.
    pub entries: Vec<SyncPlanEntry>,
    /// Number of eligible (syncable) entries.
    pub total_mods: usize,
    /// Number of eligible entries that need fetching.
    pub mods_to_sync: usize,
    /// Sum of advertised sizes of entries that need fetching.
    pub total_size_bytes: u64,
    /// Platform detected on the catalog page.
    pub platform: PlatformVersion,
}

impl SyncPlan {
    /// Entries that need fetching, in catalog order.
    pub fn pending(&self) -> impl Iterator<Item = &SyncPlanEntry> {
        self.entries.iter().filter(|e| e.needs_update)
    }

    /// Whether nothing needs fetching.
    pub fn is_up_to_date(&self) -> bool {
        self.mods_to_sync == 0
    }
}
