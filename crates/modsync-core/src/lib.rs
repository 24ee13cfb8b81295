pub mod catalog;
pub mod config;
pub mod error;
pub mod inventory;
pub mod paths;
pub mod reconcile;
pub mod session;
pub mod transfer;

pub use catalog::{Catalog, ParseError, ValidationError};
pub use config::{ConfigError, Preferences};
pub use error::SyncError;
pub use inventory::{Inventory, ScanError};
pub use paths::*;
pub use reconcile::{reconcile, transfer_jobs};
pub use transfer::{BatchHandle, BatchReport, EventSink, JobState, Orchestrator, TransferError, TransferJob};

/// User Agent string for catalog and archive requests
pub const USER_AGENT: &str = concat!("modsync-core/", env!("CARGO_PKG_VERSION"));
