//! HTTP handlers for the service routes.
//!
//! The handlers stay thin: they resolve the session, obtain a valid bearer
//! token and delegate to the management layer, returning the feedback
//! messages and playlist id the presentation layer renders.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use tokio::sync::Mutex;

use crate::{error::Error, server::AppState, types::Session};

mod auth;
mod health;
mod home;
mod playlist;

pub use auth::callback;
pub use auth::index;
pub use auth::login;
pub use health::health;
pub use home::home;
pub use playlist::create_playlist;
pub use playlist::delete_playlist;
pub use playlist::update_playlist;

pub(crate) const SESSION_COOKIE: &str = "topsongs_session";

fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    let prefix = format!("{}=", SESSION_COOKIE);
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(&prefix))
        .map(str::to_string)
}

/// Resolves the session addressed by the request's cookie.
///
/// # Errors
///
/// Returns [`Error::NeedsReauth`] when no cookie is present or the id is
/// unknown; the error response redirects to `/login`.
pub(crate) async fn require_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Arc<Mutex<Session>>, Error> {
    let session_id = session_id_from_headers(headers).ok_or(Error::NeedsReauth)?;
    state
        .sessions
        .get(&session_id)
        .await
        .ok_or(Error::NeedsReauth)
}
