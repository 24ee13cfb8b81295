//! Download everything the plan marks as pending.

use anyhow::{Context, Result, bail};
use crossterm::style::Stylize;
use modsync_core::{Orchestrator, session, transfer_jobs};
use modsync_schema::format_size;

use super::Target;
use super::status::print_summary;
use crate::TargetArgs;
use crate::ui::EventRenderer;

pub async fn sync(target: TargetArgs, dry_run: bool) -> Result<()> {
    let Target {
        server_url,
        mods_dir,
    } = target.resolve()?;

    let client = reqwest::Client::new();
    let plan = session::sync_status(&client, &server_url, &mods_dir)
        .await
        .with_context(|| format!("Failed to check {server_url}"))?;

    print_summary(&plan);
    if plan.is_up_to_date() {
        return Ok(());
    }

    let jobs = transfer_jobs(&plan, &mods_dir);

    if dry_run {
        println!();
        for item in plan.pending() {
            println!(
                "  Would download {} ({})",
                item.entry.filename,
                format_size(item.entry.size_bytes)
            );
        }
        println!("  into {}", mods_dir.display());
        return Ok(());
    }

    let orchestrator = Orchestrator::new(client);
    let mut handle = orchestrator.start(jobs)?;

    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling after the current read...");
            cancel.cancel();
        }
    });

    println!();
    let mut renderer = EventRenderer::default();
    while let Some(event) = handle.next_event().await {
        renderer.render(&event);
        if event.is_terminal() {
            break;
        }
    }

    let report = handle.finish().await?;
    println!();
    println!(
        "{}",
        format!(
            "{} downloaded, {} failed, {} skipped",
            report.committed(),
            report.failed(),
            report.skipped()
        )
        .dark_grey()
    );

    if report.cancelled {
        bail!("Sync cancelled");
    }
    if report.failed() > 0 {
        bail!("{} downloads failed", report.failed());
    }
    Ok(())
}
