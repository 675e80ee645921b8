use std::path::PathBuf;

use log::{debug, error, info, warn};

use crate::clients::{
    backup::BackupFile,
    entities::Track,
    errors::{Error, Result},
    service::MusicService,
};
use crate::ordering::sort_by_primary_artist;

pub const DEFAULT_PLAYLIST_NAME: &str = "Megs' Ultimate Playlist";

// Configuration for the Reorderer struct
#[derive(Debug, Clone)]
pub struct Config {
    pub playlist_name: String,
    pub cookie: Option<String>,
    pub backup: BackupFile,
    pub dry_run: bool,
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    playlist_name: Option<String>,
    cookie: Option<String>,
    backup_path: Option<PathBuf>,
    dry_run: bool,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn playlist_name(mut self, name: Option<String>) -> Self {
        self.playlist_name = name;
        self
    }

    #[must_use]
    pub fn cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie;
        self
    }

    #[must_use]
    pub fn backup_path(mut self, path: Option<PathBuf>) -> Self {
        self.backup_path = path;
        self
    }

    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build(self) -> Config {
        Config {
            playlist_name: self
                .playlist_name
                .unwrap_or_else(|| DEFAULT_PLAYLIST_NAME.to_string()),
            // A blank cookie is as good as none
            cookie: self.cookie.filter(|c| !c.trim().is_empty()),
            backup: self
                .backup_path
                .map(BackupFile::new)
                .unwrap_or_default(),
            dry_run: self.dry_run,
        }
    }
}

/// How a run ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sorted { tracks: usize, backup_removed: bool },
    DryRun { order: Vec<String> },
    Restored { tracks: usize, backup_removed: bool },
}

// Drives one playlist through backup, removal, sort and re-add
pub struct Reorderer<S: MusicService> {
    config: Config,
    service: S,
}

impl<S: MusicService> Reorderer<S> {
    pub fn new(config: Config, service: S) -> Self {
        Reorderer { config, service }
    }

    pub async fn reorder(&mut self) -> Result<Outcome> {
        let (playlist_id, original_tracks) = self.open_playlist().await?;
        let name = self.config.playlist_name.clone();

        if self.config.dry_run {
            let sorted = sort_by_primary_artist(original_tracks);
            let order = sorted.iter().map(describe).collect::<Vec<_>>();
            for (position, line) in order.iter().enumerate() {
                info!("{:>4}. {line}", position + 1);
            }
            info!("Dry run, playlist \"{name}\" left untouched");
            return Ok(Outcome::DryRun { order });
        }

        // An earlier run may have left the only full copy of the playlist behind
        if self.config.backup.exists().await? {
            return Err(Error::BackupExists(self.config.backup.path().to_path_buf()));
        }
        self.save_backup(&original_tracks).await;

        let removed = self
            .service
            .remove_tracks(&playlist_id, &original_tracks)
            .await;
        match removed {
            Ok(true) => info!("Removed tracks from playlist \"{name}\"."),
            Ok(false) => return Err(Error::RemoveFailed(name)),
            Err(e) => {
                error!("Remove request failed: {e}");
                return Err(Error::RemoveFailed(name));
            }
        }

        let tracks = sort_by_primary_artist(original_tracks);
        debug!("Sorted {} track(s) by primary artist", tracks.len());

        self.add_back(&playlist_id, &tracks).await?;
        info!("Added sorted tracks to playlist \"{name}\"! Deleting backup...");

        let backup_removed = self.delete_backup().await;
        Ok(Outcome::Sorted {
            tracks: tracks.len(),
            backup_removed,
        })
    }

    /// Put the backed up tracks back, in their backed up order
    pub async fn restore(&mut self) -> Result<Outcome> {
        let backup_tracks = self.config.backup.read().await?;
        if backup_tracks.is_empty() {
            return Err(Error::Backup(format!(
                "{} holds no tracks",
                self.config.backup.path().display()
            )));
        }
        info!(
            "Loaded {} track(s) from {}",
            backup_tracks.len(),
            self.config.backup.path().display()
        );

        let playlist_id = self.find_playlist_id().await?;
        let name = self.config.playlist_name.clone();

        if self.config.dry_run {
            let order = backup_tracks.iter().map(describe).collect::<Vec<_>>();
            for (position, line) in order.iter().enumerate() {
                info!("{:>4}. {line}", position + 1);
            }
            info!("Dry run, playlist \"{name}\" left untouched");
            return Ok(Outcome::DryRun { order });
        }

        let current = self
            .service
            .playlist(&playlist_id)
            .await?
            .tracks
            .unwrap_or_default();
        if !current.is_empty() {
            ensure_movable(&name, &current)?;
            match self.service.remove_tracks(&playlist_id, &current).await {
                Ok(true) => info!("Removed {} current track(s) from \"{name}\".", current.len()),
                Ok(false) => return Err(Error::RemoveFailed(name)),
                Err(e) => {
                    error!("Remove request failed: {e}");
                    return Err(Error::RemoveFailed(name));
                }
            }
        }

        self.add_back(&playlist_id, &backup_tracks).await?;
        info!("Restored playlist \"{name}\" from backup! Deleting backup...");

        let backup_removed = self.delete_backup().await;
        Ok(Outcome::Restored {
            tracks: backup_tracks.len(),
            backup_removed,
        })
    }

    async fn authenticate(&mut self) -> Result<()> {
        let Some(cookie) = self.config.cookie.as_deref() else {
            return Err(Error::MissingCredential);
        };
        debug!("Authenticating ...");
        self.service.authenticate(cookie).await
    }

    async fn find_playlist_id(&mut self) -> Result<String> {
        self.authenticate().await?;

        let name = &self.config.playlist_name;
        let playlists = self.service.library_playlists().await?;
        debug!("Found {} playlist(s) in library", playlists.len());

        let playlist = playlists
            .into_iter()
            .find(|p| p.name == *name)
            .ok_or_else(|| Error::PlaylistNotFound(name.clone()))?;
        let playlist_id = playlist
            .id
            .ok_or_else(|| Error::PlaylistWithoutId(name.clone()))?;

        info!("Found playlist: {} ({playlist_id})", playlist.name);
        Ok(playlist_id)
    }

    // Everything up to the first mutation; any error here leaves the playlist as it was
    async fn open_playlist(&mut self) -> Result<(String, Vec<Track>)> {
        let playlist_id = self.find_playlist_id().await?;
        let name = &self.config.playlist_name;

        let tracks = self
            .service
            .playlist(&playlist_id)
            .await?
            .tracks
            .filter(|tracks| !tracks.is_empty())
            .ok_or_else(|| Error::EmptyPlaylist(name.clone()))?;
        info!("Fetched {} track(s)", tracks.len());

        ensure_movable(name, &tracks)?;
        Ok((playlist_id, tracks))
    }

    // Best effort: a failed backup is logged and the run goes on
    async fn save_backup(&self, tracks: &[Track]) {
        let path = self.config.backup.path().display();
        info!("Saving backup of original playlist...");
        match self.config.backup.write(tracks).await {
            Ok(()) => info!("Backup saved to {path}"),
            Err(e) => error!("Failed to save backup: {e}"),
        }
    }

    async fn add_back(&self, playlist_id: &str, tracks: &[Track]) -> Result<()> {
        let failed = || Error::AddFailed {
            playlist: self.config.playlist_name.clone(),
            backup: self.config.backup.path().to_path_buf(),
        };

        match self.service.add_tracks(playlist_id, tracks).await {
            Ok(Some(playlist)) => {
                if let Some(count) = playlist.tracks.as_ref().map(Vec::len)
                    && count != tracks.len()
                {
                    warn!(
                        "Playlist reports {count} track(s) after adding {}",
                        tracks.len()
                    );
                }
                Ok(())
            }
            Ok(None) => Err(failed()),
            Err(e) => {
                error!("Add request failed: {e}");
                Err(failed())
            }
        }
    }

    // Non-fatal: the playlist is already in its final state
    async fn delete_backup(&self) -> bool {
        match self.config.backup.remove().await {
            Ok(()) => {
                info!("Backup deleted.");
                true
            }
            Err(e) => {
                error!("Failed to delete backup: {e}");
                false
            }
        }
    }
}

fn ensure_movable(name: &str, tracks: &[Track]) -> Result<()> {
    let count = tracks.iter().filter(|t| !t.is_movable()).count();
    if count > 0 {
        return Err(Error::UnmovableTracks {
            playlist: name.to_string(),
            count,
        });
    }
    Ok(())
}

fn describe(track: &Track) -> String {
    match track.primary_artist() {
        Some(artist) => format!("{artist} - {}", track.title),
        None => track.title.clone(),
    }
}
