use crate::{
    error::Error,
    spotify::SpotifyApi,
    types::{Track, TrackPage},
};

impl SpotifyApi {
    /// Fetches one page of a track listing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] with the HTTP status and body on any non-2xx
    /// response; the caller terminates the walk immediately.
    async fn track_page(&self, url: &str, token: &str) -> Result<TrackPage, Error> {
        let response = self.client.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<TrackPage>().await?)
    }

    /// Walks a cursor-paginated track listing starting at `start_url`,
    /// following the server-supplied `next` cursor and concatenating pages
    /// in server-returned order.
    ///
    /// With `limit` set, fetching stops as soon as enough tracks have been
    /// accumulated instead of materializing the whole listing; if the first
    /// page already satisfies the limit, no follow-up request is issued.
    pub async fn fetch_tracks(
        &self,
        start_url: &str,
        token: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Track>, Error> {
        let mut tracks: Vec<Track> = Vec::new();
        let mut next = Some(start_url.to_string());

        while let Some(url) = next {
            if limit.is_some_and(|l| tracks.len() >= l) {
                break;
            }
            let page = self.track_page(&url, token).await?;
            tracks.extend(page.items.into_iter().map(|item| item.track));
            next = page.next;
        }

        if let Some(limit) = limit {
            tracks.truncate(limit);
        }
        Ok(tracks)
    }

    /// Lists the user's saved tracks in the provider's most-recently-saved
    /// order, bounded by `limit` when given.
    pub async fn saved_tracks(
        &self,
        token: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Track>, Error> {
        let start_url = format!("{uri}/me/tracks", uri = self.api_url);
        self.fetch_tracks(&start_url, token, limit).await
    }

    /// Lists the full current contents of a playlist.
    pub async fn playlist_tracks(&self, token: &str, playlist_id: &str) -> Result<Vec<Track>, Error> {
        let start_url = format!(
            "{uri}/playlists/{id}/tracks",
            uri = self.api_url,
            id = playlist_id
        );
        self.fetch_tracks(&start_url, token, None).await
    }
}
