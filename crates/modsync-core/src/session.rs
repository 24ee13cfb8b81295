//! End-to-end operations: fetch the catalog, check it, compare with disk.

use modsync_schema::{PlatformVersion, SyncPlan};
use reqwest::Client;
use std::path::Path;

use crate::catalog::{self, Catalog};
use crate::error::SyncError;
use crate::{inventory, reconcile};

/// What a server offers, as shown after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSummary {
    pub platform: PlatformVersion,
    /// Entries that would take part in a sync.
    pub mod_count: usize,
}

/// Fetch, validate and parse the catalog at `url`.
pub async fn load_catalog(client: &Client, url: &str) -> Result<Catalog, SyncError> {
    let document = catalog::fetch_document(client, url).await?;
    catalog::validate_page(&document)?;
    Ok(catalog::parse(&document, url)?)
}

/// Check that `url` serves a catalog with downloads enabled.
pub async fn validate_server(client: &Client, url: &str) -> Result<ServerSummary, SyncError> {
    let catalog = load_catalog(client, url).await?;
    let summary = ServerSummary {
        platform: catalog.platform,
        mod_count: catalog.syncable().count(),
    };
    tracing::info!(
        "{url}: {} server with {} mods",
        summary.platform,
        summary.mod_count
    );
    Ok(summary)
}

/// Compute what `mods_dir` is missing relative to the server catalog.
pub async fn sync_status(
    client: &Client,
    server_url: &str,
    mods_dir: &Path,
) -> Result<SyncPlan, SyncError> {
    let catalog = load_catalog(client, server_url).await?;

    let dir = mods_dir.to_path_buf();
    let local = tokio::task::spawn_blocking(move || inventory::scan(&dir)).await??;

    Ok(reconcile::reconcile(&catalog, &local))
}
