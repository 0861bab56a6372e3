use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Json,
    extract::Query,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::{
    api::SESSION_COOKIE,
    error::Error,
    server::AppState,
    types::{DEFAULT_SONG_LIMIT, Session, UserRecord},
};

pub async fn index() -> Html<&'static str> {
    Html("<h2>Top Songs</h2><p><a href=\"/login\">Log in with Spotify</a></p>")
}

/// Sends the user to the provider's consent screen.
pub async fn login(Extension(state): Extension<Arc<AppState>>) -> Redirect {
    Redirect::temporary(&state.api.authorize_url())
}

/// OAuth callback. Exchanges the one-time code for a token pair, looks up or
/// stores the user record, opens a session and redirects to `/home`.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, Error> {
    if let Some(error) = params.get("error") {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": error.clone() })),
        )
            .into_response());
    }

    let Some(code) = params.get("code") else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing authorization code" })),
        )
            .into_response());
    };

    let token = state.api.exchange_code(code).await?;
    let profile = state.api.current_user(&token.access_token).await?;

    let user_name = match state.registry.find_user(&profile.id).await {
        Some(record) => record.name,
        None => {
            let name = profile.display_name.clone().unwrap_or_else(|| profile.id.clone());
            state
                .registry
                .save_user(UserRecord {
                    spotify_id: profile.id.clone(),
                    name: name.clone(),
                })
                .await?;
            name
        }
    };

    let session_id = state
        .sessions
        .create(Session {
            user_id: profile.id,
            user_name,
            token,
            song_limit: DEFAULT_SONG_LIMIT,
        })
        .await;

    let mut response = Redirect::temporary("/home").into_response();
    let cookie = format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, session_id);
    response.headers_mut().insert(
        header::SET_COOKIE,
        cookie.parse().expect("session id is alphanumeric"),
    );
    Ok(response)
}
