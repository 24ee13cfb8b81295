//! Reconciliation: join the catalog against the local inventory.

use modsync_schema::{SyncPlan, SyncPlanEntry};
use std::path::Path;

use crate::catalog::Catalog;
use crate::inventory::Inventory;
use crate::transfer::TransferJob;

/// Decide which catalog entries must be fetched.
///
/// Only syncable entries (not an asset bundle, has a download URL) are
/// counted. An entry needs syncing when it is not installed, or when the
/// installed descriptor reports a different version. An installed archive
/// whose descriptor is unreadable is left alone.
pub fn reconcile(catalog: &Catalog, local: &Inventory) -> SyncPlan {
    let mut plan = SyncPlan {
        platform: catalog.platform,
        ..Default::default()
    };

    for entry in &catalog.entries {
        let installed = local.get(&entry.filename);
        let local_version = installed.map(|d| d.version().to_string()).unwrap_or_default();

        if !entry.is_syncable() {
            plan.entries.push(SyncPlanEntry {
                entry: entry.clone(),
                needs_update: false,
                local_version,
            });
            continue;
        }

        let needs_update = match installed {
            None => true,
            Some(desc) => !desc.is_unknown() && desc.version() != entry.version,
        };

        plan.total_mods += 1;
        if needs_update {
            plan.mods_to_sync += 1;
            plan.total_size_bytes += entry.size_bytes;
        }

        plan.entries.push(SyncPlanEntry {
            entry: entry.clone(),
            needs_update,
            local_version,
        });
    }

    tracing::debug!(
        "{} of {} mods need syncing",
        plan.mods_to_sync,
        plan.total_mods
    );
    plan
}

/// One transfer job per entry that needs syncing, in catalog order.
///
/// Entries that are not syncable (including filenames that would resolve
/// outside `mods_dir`) never become jobs, even in a hand-built plan.
pub fn transfer_jobs(plan: &SyncPlan, mods_dir: &Path) -> Vec<TransferJob> {
    plan.pending()
        .filter(|p| p.entry.is_syncable())
        .map(|p| TransferJob::new(&p.entry.filename, &p.entry.download_url, mods_dir.join(&p.entry.filename)))
        .collect()
}
