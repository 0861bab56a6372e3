use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::Query,
    http::HeaderMap,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    api::require_session, error::Error, management::TokenManager, server::AppState, utils,
};

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    /// Requested track count for this session; must be positive.
    pub songs: Option<u32>,
}

/// Lists the user's current top songs, bounded by the session's requested
/// count. A `?songs=N` query updates the count for the session before the
/// listing is fetched.
pub async fn home(
    Query(query): Query<HomeQuery>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, Error> {
    let session = require_session(&state, &headers).await?;

    if let Some(songs) = query.songs {
        if songs >= 1 {
            session.lock().await.song_limit = songs;
        }
    }

    let token = TokenManager::new(Arc::clone(&session))
        .get_valid_token(&state.api)
        .await?;

    let (user_name, song_limit) = {
        let session = session.lock().await;
        (session.user_name.clone(), session.song_limit)
    };

    let tracks = state.api.saved_tracks(&token, Some(song_limit as usize)).await?;
    let songs = utils::song_entries(&tracks, song_limit as usize);

    Ok(Json(json!({
        "user_name": user_name,
        "song_limit": song_limit,
        "songs": songs,
    })))
}
