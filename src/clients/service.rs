use async_trait::async_trait;

use crate::clients::{
    entities::{Playlist, PlaylistSummary, Track},
    errors::Result,
};

/// Capabilities the reordering procedure needs from a music service.
///
/// Every call is attempted once; implementations must not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MusicService: Send + Sync {
    /// Start a session from a browser cookie string
    async fn authenticate(&mut self, cookie: &str) -> Result<()>;

    async fn library_playlists(&self) -> Result<Vec<PlaylistSummary>>;

    async fn playlist(&self, playlist_id: &str) -> Result<Playlist>;

    /// Returns `false` when the service refused the removal
    async fn remove_tracks(&self, playlist_id: &str, tracks: &[Track]) -> Result<bool>;

    /// Returns the updated playlist, or `None` when the service refused the insert
    async fn add_tracks(&self, playlist_id: &str, tracks: &[Track]) -> Result<Option<Playlist>>;
}
