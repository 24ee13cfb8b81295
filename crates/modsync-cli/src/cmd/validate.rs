//! Check a server before saving it.

use anyhow::Result;
use crossterm::style::Stylize;
use modsync_core::session;

use crate::ui::Theme;

pub async fn validate(url: &str) -> Result<()> {
    let theme = Theme::default();
    let client = reqwest::Client::new();

    let summary = session::validate_server(&client, url).await?;

    println!(
        "{} {}",
        theme.icons.success.with(theme.colors.success),
        url.with(theme.colors.name)
    );
    println!("  {:<10}{}", "Game:", summary.platform);
    println!("  {:<10}{}", "Mods:", summary.mod_count);
    Ok(())
}
