//! modsync - mod folder sync CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use modsync_cli::cmd;
use modsync_cli::{Cli, Commands, ConfigCommands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let dry_run = cli.dry_run;

    match cli.command {
        Commands::Validate { url } => cmd::validate::validate(&url).await,
        Commands::Status { target } => cmd::status::status(target).await,
        Commands::Sync { target } => cmd::sync::sync(target, dry_run).await,
        Commands::Config { command } => match command {
            ConfigCommands::Show => cmd::config::show(),
            ConfigCommands::Set { server, dir, game } => {
                cmd::config::set(server, dir, game, dry_run)
            }
            ConfigCommands::Path => cmd::config::path(),
        },
    }
}
