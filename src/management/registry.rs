use std::{io::ErrorKind, path::PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    error::Error,
    types::{ManagedPlaylist, UserRecord},
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct RegistryData {
    users: Vec<UserRecord>,
    playlists: Vec<ManagedPlaylist>,
}

/// JSON-file-backed store for user records and managed-playlist bookkeeping.
///
/// Invariant: at most one [`ManagedPlaylist`] per (owner, song_count) pair.
/// All mutations run as read-modify-write under a single lock and hit disk
/// through a write-then-rename, so concurrent requests never observe a
/// half-written file.
pub struct PlaylistRegistry {
    path: PathBuf,
    data: Mutex<RegistryData>,
}

impl PlaylistRegistry {
    /// Opens the registry at `path`, starting empty if no file exists yet.
    pub async fn open(path: PathBuf) -> Result<Self, Error> {
        let data = match async_fs::read_to_string(&path).await {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == ErrorKind::NotFound => RegistryData::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(PlaylistRegistry {
            path,
            data: Mutex::new(data),
        })
    }

    async fn persist(&self, data: &RegistryData) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Looks up the managed playlist for (owner, song_count), if any.
    pub async fn find_playlist(&self, owner_id: &str, song_count: u32) -> Option<String> {
        let data = self.data.lock().await;
        data.playlists
            .iter()
            .find(|p| p.owner_id == owner_id && p.song_count == song_count)
            .map(|p| p.playlist_id.clone())
    }

    /// Saves a managed-playlist record, replacing any existing record for
    /// the same (owner, song_count) pair.
    pub async fn save_playlist(&self, record: ManagedPlaylist) -> Result<(), Error> {
        let mut data = self.data.lock().await;
        data.playlists
            .retain(|p| !(p.owner_id == record.owner_id && p.song_count == record.song_count));
        data.playlists.push(record);
        self.persist(&data).await
    }

    /// Removes the managed-playlist record for (owner, song_count).
    pub async fn delete_playlist(&self, owner_id: &str, song_count: u32) -> Result<(), Error> {
        let mut data = self.data.lock().await;
        data.playlists
            .retain(|p| !(p.owner_id == owner_id && p.song_count == song_count));
        self.persist(&data).await
    }

    pub async fn find_user(&self, spotify_id: &str) -> Option<UserRecord> {
        let data = self.data.lock().await;
        data.users.iter().find(|u| u.spotify_id == spotify_id).cloned()
    }

    /// Saves a user record, replacing any existing record for the same id.
    pub async fn save_user(&self, record: UserRecord) -> Result<(), Error> {
        let mut data = self.data.lock().await;
        data.users.retain(|u| u.spotify_id != record.spotify_id);
        data.users.push(record);
        self.persist(&data).await
    }
}
