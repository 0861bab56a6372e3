use crate::{
    error::Error,
    spotify::SpotifyApi,
    types::{
        AddTracksRequest, CreatePlaylistRequest, CreatePlaylistResponse, RemoveTracksRequest,
        TrackUri,
    },
    utils,
};

/// The provider rejects playlist mutations above 100 tracks per call, so
/// chunking is mandatory, not an optimization.
pub const MAX_BATCH_SIZE: usize = 100;

impl SpotifyApi {
    /// Creates a new private playlist and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Create`] on any non-2xx response. Nothing is
    /// persisted locally on failure, so re-invoking create is safe.
    pub async fn create_playlist(&self, token: &str, name: &str) -> Result<String, Error> {
        let api_url = format!("{uri}/me/playlists", uri = self.api_url);
        let request = CreatePlaylistRequest {
            name: name.to_string(),
            public: false,
        };

        let response = self
            .client
            .post(&api_url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Create {
                status: status.as_u16(),
                body,
            });
        }

        let created = response.json::<CreatePlaylistResponse>().await?;
        Ok(created.id)
    }

    /// Adds tracks to a playlist in sequential chunks of at most
    /// [`MAX_BATCH_SIZE`], preserving input order so the final playlist
    /// order matches the source ranking.
    ///
    /// # Errors
    ///
    /// A failed chunk aborts the remaining chunks and returns
    /// [`Error::Batch`] with the failed chunk index and the number of
    /// tracks applied by the preceding chunks.
    pub async fn add_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), Error> {
        let api_url = format!(
            "{uri}/playlists/{id}/tracks",
            uri = self.api_url,
            id = playlist_id
        );

        let mut applied = 0;
        for (index, chunk) in utils::chunked(track_ids, MAX_BATCH_SIZE).into_iter().enumerate() {
            let request = AddTracksRequest {
                uris: chunk.iter().map(|id| utils::track_uri(id)).collect(),
            };

            let response = self
                .client
                .post(&api_url)
                .bearer_auth(token)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Batch {
                    chunk: index,
                    applied,
                    status: status.as_u16(),
                    body,
                });
            }
            applied += chunk.len();
        }

        Ok(())
    }

    /// Removes tracks from a playlist with the same chunking and sequencing
    /// as [`add_tracks`](Self::add_tracks).
    pub async fn remove_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), Error> {
        let api_url = format!(
            "{uri}/playlists/{id}/tracks",
            uri = self.api_url,
            id = playlist_id
        );

        let mut applied = 0;
        for (index, chunk) in utils::chunked(track_ids, MAX_BATCH_SIZE).into_iter().enumerate() {
            let request = RemoveTracksRequest {
                tracks: chunk
                    .iter()
                    .map(|id| TrackUri {
                        uri: utils::track_uri(id),
                    })
                    .collect(),
            };

            let response = self
                .client
                .delete(&api_url)
                .bearer_auth(token)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Batch {
                    chunk: index,
                    applied,
                    status: status.as_u16(),
                    body,
                });
            }
            applied += chunk.len();
        }

        Ok(())
    }

    /// Follows a playlist on behalf of the user.
    pub async fn follow_playlist(&self, token: &str, playlist_id: &str) -> Result<(), Error> {
        let api_url = format!(
            "{uri}/playlists/{id}/followers",
            uri = self.api_url,
            id = playlist_id
        );

        let response = self.client.put(&api_url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Fetch {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Unfollows a playlist. The provider has no delete-playlist operation;
    /// unfollowing removes it from the owner's library and is the closest
    /// analogue.
    pub async fn unfollow_playlist(&self, token: &str, playlist_id: &str) -> Result<(), Error> {
        let api_url = format!(
            "{uri}/playlists/{id}/followers",
            uri = self.api_url,
            id = playlist_id
        );

        let response = self.client.delete(&api_url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Fetch {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
