//! Print the sync plan without touching disk.

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use modsync_core::session;
use modsync_schema::{SyncPlan, SyncPlanEntry, format_size};

use super::Target;
use crate::TargetArgs;
use crate::ui::Theme;
use crate::ui::theme::fit;

pub async fn status(target: TargetArgs) -> Result<()> {
    let Target {
        server_url,
        mods_dir,
    } = target.resolve()?;

    let client = reqwest::Client::new();
    let plan = session::sync_status(&client, &server_url, &mods_dir)
        .await
        .with_context(|| format!("Failed to check {server_url}"))?;

    let theme = Theme::default();
    println!();
    println!("{:<10}{server_url}", "Server:");
    println!("{:<10}{}", "Mods:", mods_dir.display());
    println!("{:<10}{}", "Game:", plan.platform);
    println!();

    for entry in &plan.entries {
        print_entry(&theme, entry);
    }

    println!();
    print_summary(&plan);
    Ok(())
}

pub(crate) fn print_summary(plan: &SyncPlan) {
    if plan.is_up_to_date() {
        println!("{}", format!("All {} mods are up to date", plan.total_mods).dark_grey());
    } else {
        println!(
            "{}",
            format!(
                "{} of {} mods need syncing ({})",
                plan.mods_to_sync,
                plan.total_mods,
                format_size(plan.total_size_bytes)
            )
            .dark_grey()
        );
    }
}

fn print_entry(theme: &Theme, item: &SyncPlanEntry) {
    let entry = &item.entry;
    let name = format!(
        "{:<width$}",
        fit(&entry.filename, theme.name_width),
        width = theme.name_width
    );
    let remote = format!("{:<width$}", entry.version, width = theme.version_width);

    if !entry.is_syncable() {
        let reason = if entry.is_package_asset {
            "asset, not downloadable"
        } else {
            "no download link"
        };
        println!(
            "  {} {} {}",
            theme.icons.warning.with(theme.colors.secondary),
            name.with(theme.colors.secondary),
            reason.with(theme.colors.secondary)
        );
    } else if !item.needs_update {
        println!(
            "  {} {} {}",
            theme.icons.success.with(theme.colors.success),
            name.with(theme.colors.name),
            remote.with(theme.colors.secondary)
        );
    } else if item.local_version.is_empty() {
        println!(
            "  {} {} {} {}",
            theme.icons.pending.with(theme.colors.warning),
            name.with(theme.colors.name),
            remote,
            format!("new, {}", format_size(entry.size_bytes)).with(theme.colors.secondary)
        );
    } else {
        println!(
            "  {} {} {} {}",
            theme.icons.pending.with(theme.colors.warning),
            name.with(theme.colors.name),
            remote,
            format!("installed {}", item.local_version).with(theme.colors.secondary)
        );
    }
}
