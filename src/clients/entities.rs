use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Artist {
    pub fn named(name: impl Into<String>) -> Self {
        Artist {
            name: Some(name.into()),
            id: None,
        }
    }
}

/// A playlist entry as the service returns it.
///
/// `video_id` identifies the song and is what gets added back,
/// `set_video_id` identifies this entry inside one playlist and is what gets removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub video_id: Option<String>,
    #[serde(default)]
    pub set_video_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl Track {
    /// First listed artist's name, used as the sort key
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().and_then(|a| a.name.as_deref())
    }

    // A track can only survive remove + re-add when both ids are known
    pub fn is_movable(&self) -> bool {
        self.video_id.is_some() && self.set_video_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: Option<String>,
    pub tracks: Option<Vec<Track>>,
}
