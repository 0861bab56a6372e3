use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::{error::Error, spotify::SpotifyApi, types::Session};

/// Gatekeeper for one session's access token.
///
/// Every remote call obtains its bearer token through here. A token that is
/// still within its lifetime is returned as-is with zero network calls;
/// an expired one triggers exactly one refresh while the session lock is
/// held, so concurrent requests discovering the expiry wait and reuse the
/// result instead of racing the provider (old refresh tokens can become
/// invalid after one use).
pub struct TokenManager {
    session: Arc<Mutex<Session>>,
}

impl TokenManager {
    pub fn new(session: Arc<Mutex<Session>>) -> Self {
        TokenManager { session }
    }

    /// Returns a currently valid access token, refreshing it first if the
    /// stored one has expired. The refreshed token pair is written back
    /// into the session before the token is handed out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when the provider rejects the refresh token;
    /// the user must re-authenticate.
    pub async fn get_valid_token(&self, api: &SpotifyApi) -> Result<String, Error> {
        let mut session = self.session.lock().await;

        let now = Utc::now().timestamp() as u64;
        if !session.token.is_expired(now) {
            return Ok(session.token.access_token.clone());
        }

        let response = api.refresh_token(&session.token.refresh_token).await?;
        let now = Utc::now().timestamp() as u64;
        session.token.apply_refresh(response, now);

        Ok(session.token.access_token.clone())
    }
}
