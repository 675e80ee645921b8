use std::path::{Path, PathBuf};

use log::debug;

use crate::clients::{
    entities::Track,
    errors::{Error, Result},
};

pub const DEFAULT_BACKUP_FILE: &str = "playlist_backup.json";

/// JSON snapshot of a playlist's tracks, kept on disk while the playlist is being rewritten
#[derive(Debug, Clone)]
pub struct BackupFile {
    path: PathBuf,
}

impl BackupFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        BackupFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, tracks: &[Track]) -> Result<()> {
        let contents = serde_json::to_vec(tracks)?;
        tokio::fs::write(&self.path, contents).await?;
        debug!("Wrote {} track(s) to {:?}", tracks.len(), self.path);
        Ok(())
    }

    pub async fn read(&self) -> Result<Vec<Track>> {
        let contents = tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::Backup(format!("cannot read {}: {e}", self.path.display())))?;
        let tracks: Vec<Track> = serde_json::from_slice(&contents)?;
        debug!("Read {} track(s) from {:?}", tracks.len(), self.path);
        Ok(tracks)
    }

    pub async fn exists(&self) -> Result<bool> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    pub async fn remove(&self) -> Result<()> {
        tokio::fs::remove_file(&self.path).await?;
        debug!("Removed backup {:?}", self.path);
        Ok(())
    }
}

impl Default for BackupFile {
    fn default() -> Self {
        BackupFile::new(DEFAULT_BACKUP_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::entities::Artist;
    use tempfile::tempdir;

    fn tracks() -> Vec<Track> {
        vec![
            Track {
                video_id: Some("v1".into()),
                set_video_id: Some("s1".into()),
                title: "B".into(),
                artists: vec![Artist::named("Zeta")],
                album: Some("Album".into()),
                duration: Some("2:00".into()),
            },
            Track {
                video_id: Some("v2".into()),
                set_video_id: Some("s2".into()),
                title: "A".into(),
                artists: vec![],
                album: None,
                duration: None,
            },
        ]
    }

    #[tokio::test]
    async fn test_write_then_read_returns_original_tracks() {
        let dir = tempdir().unwrap();
        let backup = BackupFile::new(dir.path().join("backup.json"));

        backup.write(&tracks()).await.unwrap();

        assert!(backup.exists().await.unwrap());
        assert_eq!(backup.read().await.unwrap(), tracks());
    }

    #[tokio::test]
    async fn test_written_file_is_json_array() {
        let dir = tempdir().unwrap();
        let backup = BackupFile::new(dir.path().join("backup.json"));
        backup.write(&tracks()).await.unwrap();

        let raw = std::fs::read_to_string(backup.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["title"], "B");
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempdir().unwrap();
        let backup = BackupFile::new(dir.path().join("backup.json"));
        backup.write(&tracks()).await.unwrap();

        backup.remove().await.unwrap();

        assert!(!backup.exists().await.unwrap());
        assert!(backup.remove().await.is_err());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let backup = BackupFile::new(dir.path().join("missing.json"));
        assert!(matches!(backup.read().await, Err(Error::Backup(_))));
    }

    #[test]
    fn test_default_path() {
        assert_eq!(BackupFile::default().path(), Path::new(DEFAULT_BACKUP_FILE));
    }
}
