use std::sync::Arc;

use axum::{Extension, Json, http::HeaderMap};
use serde_json::{Value, json};

use crate::{
    api::require_session, error::Error, management::TokenManager, server::AppState,
};

async fn session_context(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(String, String, u32), Error> {
    let session = require_session(state, headers).await?;
    let token = TokenManager::new(Arc::clone(&session))
        .get_valid_token(&state.api)
        .await?;
    let (owner_id, song_limit) = {
        let session = session.lock().await;
        (session.user_id.clone(), session.song_limit)
    };
    Ok((token, owner_id, song_limit))
}

/// Creates the managed playlist for the session's requested count and fills
/// it right away. Calling it again never creates a second remote playlist;
/// the existing one is reported and resynchronized instead.
pub async fn create_playlist(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, Error> {
    let (token, owner_id, song_limit) = session_context(&state, &headers).await?;

    let created = state
        .sync
        .ensure_created(&state.api, &token, &owner_id, song_limit)
        .await?;
    let updated = state
        .sync
        .synchronize(&state.api, &token, &owner_id, song_limit)
        .await?;

    Ok(Json(json!({
        "feedback": [created.feedback, updated.feedback],
        "playlist_id": created.playlist_id,
    })))
}

/// Replaces the managed playlist's contents with the current top songs.
pub async fn update_playlist(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, Error> {
    let (token, owner_id, song_limit) = session_context(&state, &headers).await?;

    let outcome = state
        .sync
        .synchronize(&state.api, &token, &owner_id, song_limit)
        .await?;

    Ok(Json(json!({
        "feedback": [outcome.feedback],
        "playlist_id": outcome.playlist_id,
    })))
}

/// Unfollows the managed playlist and drops its record.
pub async fn delete_playlist(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, Error> {
    let (token, owner_id, song_limit) = session_context(&state, &headers).await?;

    let outcome = state
        .sync
        .teardown(&state.api, &token, &owner_id, song_limit)
        .await?;

    Ok(Json(json!({
        "feedback": [outcome.feedback],
        "playlist_id": outcome.playlist_id,
    })))
}
