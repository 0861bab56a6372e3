use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    error::Error,
    management::PlaylistRegistry,
    spotify::SpotifyApi,
    types::ManagedPlaylist,
    utils,
};

/// Result of a playlist operation: the feedback message the presentation
/// layer renders and the playlist id, when one is involved.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub feedback: String,
    pub playlist_id: Option<String>,
}

impl SyncOutcome {
    fn new(feedback: impl Into<String>, playlist_id: Option<String>) -> Self {
        SyncOutcome {
            feedback: feedback.into(),
            playlist_id,
        }
    }
}

/// Orchestrates the managed playlist per (owner, requested count):
/// find-or-create, full-replace update and unfollow.
///
/// (owner, count) doubles as a mutual-exclusion key. A second operation for
/// the same key while one is in flight waits for it instead of interleaving;
/// the provider gives no transactional guarantee across chunked calls, so
/// concurrent remove/add sequences would corrupt the playlist.
pub struct SyncManager {
    registry: Arc<PlaylistRegistry>,
    locks: Mutex<HashMap<(String, u32), Arc<Mutex<()>>>>,
}

impl SyncManager {
    pub fn new(registry: Arc<PlaylistRegistry>) -> Self {
        SyncManager {
            registry,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, owner_id: &str, song_count: u32) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry((owner_id.to_string(), song_count))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Creates the "Top N Songs" playlist for (owner, count) unless one is
    /// already on record, in which case the existing id is reported back and
    /// the remote playlist is best-effort re-followed (the user may have
    /// removed it from their library; failure to re-follow is swallowed).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Create`] when the remote creation call fails; no
    /// record is persisted in that case, so a later retry attempts creation
    /// again instead of being blocked by a stale record.
    pub async fn ensure_created(
        &self,
        api: &SpotifyApi,
        token: &str,
        owner_id: &str,
        song_count: u32,
    ) -> Result<SyncOutcome, Error> {
        let guard = self.lock_for(owner_id, song_count).await;
        let _held = guard.lock().await;

        if let Some(playlist_id) = self.registry.find_playlist(owner_id, song_count).await {
            let _ = api.follow_playlist(token, &playlist_id).await;
            return Ok(SyncOutcome::new(
                format!(
                    "You have already created a playlist with your top {} songs.",
                    song_count
                ),
                Some(playlist_id),
            ));
        }

        let name = format!("Top {} Songs", song_count);
        let playlist_id = api.create_playlist(token, &name).await?;
        self.registry
            .save_playlist(ManagedPlaylist {
                owner_id: owner_id.to_string(),
                playlist_id: playlist_id.clone(),
                song_count,
            })
            .await?;

        Ok(SyncOutcome::new(
            "Playlist created successfully!",
            Some(playlist_id),
        ))
    }

    /// Full-replace update: clears the remote playlist, then repopulates it
    /// with the owner's current top `song_count` saved tracks in source
    /// order. Remove-all strictly precedes add-all; no incremental diff is
    /// attempted.
    ///
    /// # Errors
    ///
    /// A [`Error::Batch`] mid-sequence leaves the playlist partially
    /// cleared or partially filled; recovery is a follow-up synchronize.
    pub async fn synchronize(
        &self,
        api: &SpotifyApi,
        token: &str,
        owner_id: &str,
        song_count: u32,
    ) -> Result<SyncOutcome, Error> {
        let guard = self.lock_for(owner_id, song_count).await;
        let _held = guard.lock().await;

        let Some(playlist_id) = self.registry.find_playlist(owner_id, song_count).await else {
            return Ok(SyncOutcome::new("No playlist found.", None));
        };

        let current = api.playlist_tracks(token, &playlist_id).await?;
        let current_ids: Vec<String> = current.iter().map(|t| t.id.clone()).collect();
        api.remove_tracks(token, &playlist_id, &current_ids).await?;

        let top = api.saved_tracks(token, Some(song_count as usize)).await?;
        let top_ids = utils::top_track_ids(&top, song_count as usize);
        api.add_tracks(token, &playlist_id, &top_ids).await?;

        Ok(SyncOutcome::new(
            "Playlist updated successfully!",
            Some(playlist_id),
        ))
    }

    /// Unfollows the managed playlist and drops its record. The provider has
    /// no delete-playlist operation, so unfollowing is the closest analogue.
    pub async fn teardown(
        &self,
        api: &SpotifyApi,
        token: &str,
        owner_id: &str,
        song_count: u32,
    ) -> Result<SyncOutcome, Error> {
        let guard = self.lock_for(owner_id, song_count).await;
        let _held = guard.lock().await;

        let Some(playlist_id) = self.registry.find_playlist(owner_id, song_count).await else {
            return Ok(SyncOutcome::new(
                "No playlist found. Please create a playlist first.",
                None,
            ));
        };

        api.unfollow_playlist(token, &playlist_id).await?;
        self.registry.delete_playlist(owner_id, song_count).await?;

        Ok(SyncOutcome::new(
            "Playlist deleted successfully!",
            Some(playlist_id),
        ))
    }
}
