//! Ytmsort - Sort a YouTube Music playlist by primary artist
//!
//! This library backs a playlist up locally, removes its tracks and adds them
//! back ordered by the name of each track's first artist.

/// Client modules for interacting with the music service and local storage
pub mod clients;
/// Artist name collation and playlist sorting
pub mod ordering;
/// The backup, remove, sort and re-add procedure
pub mod reorder;
