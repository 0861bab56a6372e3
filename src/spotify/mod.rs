//! Spotify Web API client.
//!
//! Thin typed layer over the provider endpoints the sync pipeline consumes:
//! the OAuth token endpoint ([`auth`]), the paginated saved-tracks and
//! playlist-tracks listings ([`tracks`]), the chunked playlist mutations
//! ([`playlist`]) and the user profile ([`users`]). All requests go through
//! one [`reqwest`] client carrying a request timeout so a stalled remote
//! call surfaces as an error instead of hanging the pipeline.

use std::time::Duration;

use reqwest::Client;

use crate::config;

pub mod auth;
pub mod playlist;
pub mod tracks;
pub mod users;

/// Timeout applied to every remote call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SpotifyApi {
    client: Client,
    api_url: String,
    auth_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
}

impl SpotifyApi {
    pub fn new(
        api_url: String,
        auth_url: String,
        token_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        scope: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build http client");

        SpotifyApi {
            client,
            api_url,
            auth_url,
            token_url,
            client_id,
            client_secret,
            redirect_uri,
            scope,
        }
    }

    /// Builds the client from the application configuration.
    pub fn from_env() -> Self {
        Self::new(
            config::spotify_apiurl(),
            config::spotify_apiauth_url(),
            config::spotify_apitoken_url(),
            config::spotify_client_id(),
            config::spotify_client_secret(),
            config::spotify_redirect_uri(),
            config::spotify_scope(),
        )
    }
}
