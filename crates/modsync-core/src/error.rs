use thiserror::Error;

use crate::catalog::{FetchError, ParseError, ValidationError};
use crate::config::ConfigError;
use crate::inventory::ScanError;
use crate::transfer::TransferError;

/// Any failure surfaced by a session operation.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
