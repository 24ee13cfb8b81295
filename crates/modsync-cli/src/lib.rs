//! modsync - keep a local mods folder in step with a dedicated server
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! The server's web interface publishes a catalog page listing every mod it
//! runs. `modsync` reads that page, opens each archive already in the local
//! mods folder to learn its version, and downloads whatever is missing or
//! out of date.
//!
//! # Resolution order
//!
//! ```text
//! server URL:  --server  >  MODSYNC_SERVER_URL  >  saved preferences
//! mods dir:    --dir     >  saved preferences   >  ~/Documents/My Games/<game>/mods
//! ```

pub mod cmd;
pub mod ui;

use clap::{Parser, Subcommand};
use modsync_schema::PlatformVersion;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "modsync")]
#[command(author, version = env!("MODSYNC_VERSION"), about = "modsync - sync mods from a dedicated server")]
pub struct Cli {
    /// Show what would happen without downloading anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to sync from and to. Both fall back to saved preferences.
#[derive(Debug, Clone, clap::Args)]
pub struct TargetArgs {
    /// Catalog page URL of the server (e.g. http://host:8080/mods.html)
    #[arg(long, env = "MODSYNC_SERVER_URL")]
    pub server: Option<String>,

    /// Local mods directory
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that a server publishes its mods for download
    Validate {
        /// Catalog page URL
        url: String,
    },

    /// Show which mods are missing or out of date
    Status {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Download missing and outdated mods
    Sync {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Show or change saved preferences
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print saved preferences
    Show,
    /// Update saved preferences
    Set {
        /// Catalog page URL
        #[arg(long)]
        server: Option<String>,
        /// Local mods directory
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Game release (FS22 or FS25)
        #[arg(long)]
        game: Option<PlatformVersion>,
    },
    /// Print the preferences file location
    Path,
}
