use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Default number of songs mirrored into the managed playlist when a session
/// has not requested a specific count.
pub const DEFAULT_SONG_LIMIT: u32 = 20;

/// OAuth access/refresh token pair with its absolute expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    /// True once `now` has reached the token's absolute expiry.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.obtained_at + self.expires_in
    }

    /// Applies a refresh response. The provider may omit refresh-token
    /// rotation, in which case the old refresh token is retained.
    pub fn apply_refresh(&mut self, response: TokenResponse, now: u64) {
        self.access_token = response.access_token;
        if let Some(rotated) = response.refresh_token {
            self.refresh_token = rotated;
        }
        self.expires_in = response.expires_in;
        self.obtained_at = now;
    }
}

/// Wire shape of the provider's token endpoint response, for both the
/// authorization-code exchange and the refresh grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
}

impl TokenResponse {
    /// Turns an authorization-code exchange response into a fresh token.
    /// The exchange grant always returns a refresh token; a missing one is
    /// treated as an empty credential and will surface on the first refresh.
    pub fn into_token(self) -> Token {
        Token {
            access_token: self.access_token,
            refresh_token: self.refresh_token.unwrap_or_default(),
            expires_in: self.expires_in,
            obtained_at: Utc::now().timestamp() as u64,
        }
    }
}

/// Per-user server-side session created on a successful code exchange.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub user_name: String,
    pub token: Token,
    pub song_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<TrackArtist>,
}

/// One element of a saved-tracks or playlist-tracks listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackItem {
    pub track: Track,
}

/// A finite page of tracks plus the continuation cursor to the next page,
/// shared by the saved-tracks and playlist-tracks listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPage {
    pub items: Vec<TrackItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackUri>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackUri {
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
}

/// Bookkeeping record for a playlist this service created. At most one
/// record exists per (owner, song_count) pair and the playlist id never
/// changes once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedPlaylist {
    pub owner_id: String,
    pub playlist_id: String,
    pub song_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub spotify_id: String,
    pub name: String,
}

/// What the presentation layer consumes: song name plus joined artist names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongEntry {
    pub name: String,
    pub artists: String,
}
