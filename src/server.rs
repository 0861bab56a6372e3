use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Extension, Router, routing::get};

use crate::{
    api, config, error,
    management::{PlaylistRegistry, SessionManager, SyncManager},
    spotify::SpotifyApi,
};

/// Shared state injected into every handler.
pub struct AppState {
    pub api: SpotifyApi,
    pub sessions: SessionManager,
    pub sync: SyncManager,
    pub registry: Arc<PlaylistRegistry>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/home", get(api::home))
        .route("/create_playlist", get(api::create_playlist))
        .route("/update_playlist", get(api::update_playlist))
        .route("/delete_playlist", get(api::delete_playlist))
        .layer(Extension(state))
}

pub async fn start_server(state: Arc<AppState>) {
    let app = router(state);

    let addr = match SocketAddr::from_str(&config::server_addr()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
