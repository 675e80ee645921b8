/// Local JSON backup of a playlist's tracks
pub mod backup;
/// Data entities for playlists, tracks and artists
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Capability interface of a remote music service
pub mod service;
/// YouTube Music API client
pub mod ytmusic;

pub use backup::BackupFile;
pub use service::MusicService;
pub use ytmusic::YouTubeMusicClient;
