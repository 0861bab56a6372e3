use std::sync::Arc;

use topsongs::{
    config, error, info,
    management::{PlaylistRegistry, SessionManager, SyncManager},
    server::{self, AppState},
    spotify::SpotifyApi,
};

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let registry = match PlaylistRegistry::open(config::registry_path()).await {
        Ok(registry) => Arc::new(registry),
        Err(e) => error!("Failed to open registry: {}", e),
    };

    let state = Arc::new(AppState {
        api: SpotifyApi::from_env(),
        sessions: SessionManager::new(),
        sync: SyncManager::new(Arc::clone(&registry)),
        registry,
    });

    info!("Listening on {}", config::server_addr());
    server::start_server(state).await;
}
