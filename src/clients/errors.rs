use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "No cookie string provided. Please provide a cookie string using the --cookie flag or define one in the YTM_COOKIE environment variable."
    )]
    MissingCredential,

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Client is not authenticated, call authenticate first")]
    NotAuthenticated,

    #[error("Playlist \"{0}\" not found.")]
    PlaylistNotFound(String),

    #[error("Playlist \"{0}\" does not have an ID.")]
    PlaylistWithoutId(String),

    #[error("Playlist \"{0}\" does not have any tracks.")]
    EmptyPlaylist(String),

    #[error("Playlist \"{playlist}\" has {count} track(s) that cannot be removed and re-added")]
    UnmovableTracks { playlist: String, count: usize },

    #[error("Failed to remove tracks from playlist \"{0}\".")]
    RemoveFailed(String),

    #[error(
        "Failed to add tracks to playlist \"{playlist}\". Use {} to restore the original playlist (ytmsort restore).",
        .backup.display()
    )]
    AddFailed { playlist: String, backup: PathBuf },

    #[error(
        "A backup already exists at {}. Restore it with ytmsort restore, or remove it before sorting again.",
        .0.display()
    )]
    BackupExists(PathBuf),

    #[error("Backup error: {0}")]
    Backup(String),

    #[error("YouTube Music unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
