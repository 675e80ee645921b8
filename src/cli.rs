use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;
use ytmsort::clients::{YouTubeMusicClient, errors::Result};
use ytmsort::reorder::{ConfigBuilder, DEFAULT_PLAYLIST_NAME, Outcome, Reorderer};

#[derive(Parser, Debug)]
#[command(name = "ytmsort")]
#[command(version, about = "Sort a YouTube Music playlist by primary artist", long_about = None)]
pub struct Cli {
    /// Name of the library playlist to sort
    #[arg(long, global = true, default_value = DEFAULT_PLAYLIST_NAME)]
    name: String,

    /// Browser cookie string of a logged in music.youtube.com session
    #[arg(long, global = true, env = "YTM_COOKIE", hide_env_values = true)]
    cookie: Option<String>,

    /// Where the backup of the original track order is written
    #[arg(long, global = true, default_value = ytmsort::clients::backup::DEFAULT_BACKUP_FILE)]
    backup: PathBuf,

    /// Print the sorted order without touching the playlist
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Sort the playlist by primary artist (default)
    Sort,
    /// Put the tracks from the backup file back into the playlist
    Restore,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    execute(cli).await
}

async fn execute(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Sort);
    let config = ConfigBuilder::new()
        .playlist_name(Some(cli.name))
        .cookie(cli.cookie)
        .backup_path(Some(cli.backup))
        .dry_run(cli.dry_run)
        .build();

    let client = YouTubeMusicClient::try_default()?;
    let mut reorderer = Reorderer::new(config, client);

    let outcome = match command {
        Commands::Sort => reorderer.reorder().await?,
        Commands::Restore => reorderer.restore().await?,
    };
    match outcome {
        Outcome::Sorted { tracks, .. } => info!("Sorted {tracks} track(s)."),
        Outcome::DryRun { order } => info!("Dry run listed {} track(s).", order.len()),
        Outcome::Restored { tracks, .. } => info!("Restored {tracks} track(s)."),
    }
    Ok(())
}
