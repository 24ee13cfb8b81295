//! Shared types for modsync.
//!
//! Everything that crosses a crate boundary lives here: catalog entries as the
//! server advertises them, descriptors read from installed archives, the sync
//! plan produced by reconciliation, and the events emitted while a batch runs.

pub mod event;
pub mod size;
pub mod types;

// Re-exports
pub use event::SyncEvent;
pub use size::{format_size, format_speed, parse_size_bytes};
pub use types::*;

/// Extension of a downloadable mod archive.
pub const ARCHIVE_EXT: &str = ".zip";

/// Extension of a bundled asset (DLC) that is never downloaded.
pub const ASSET_EXT: &str = ".dlc";

/// Relative path prefix that download links carry on the catalog page.
pub const DOWNLOAD_PREFIX: &str = "mods/";

/// Name of the descriptor embedded in every mod archive (matched case-insensitively).
pub const DESCRIPTOR_FILE: &str = "modDesc.xml";

/// Suffix appended to a destination path while its transfer is in flight.
pub const STAGING_SUFFIX: &str = ".tmp";

/// Version reported for an installed archive whose descriptor could not be read.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Substring whose presence on the catalog page identifies the newer platform.
pub const NEWER_PLATFORM_MARKER: &str = "10.0.0.0";
