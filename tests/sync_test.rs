//! End-to-end tests for the sync pipeline against a fake provider server.
//!
//! The fake serves the same wire shapes as the real provider: a token
//! endpoint, cursor-paginated track listings and the chunked playlist
//! mutation endpoints, with switchable failure injection.

use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use topsongs::{
    Error,
    management::{PlaylistRegistry, SyncManager, TokenManager},
    spotify::SpotifyApi,
    types::{DEFAULT_SONG_LIMIT, Session, Token},
    utils,
};

#[derive(Default)]
struct FakeState {
    base_url: String,
    saved: Vec<String>,
    page_size: usize,
    saved_requests: usize,
    playlists: HashMap<String, Vec<String>>,
    created: usize,
    fail_create: bool,
    remove_requests: usize,
    fail_remove_request: Option<usize>,
    token_requests: usize,
    rotate_refresh: Option<String>,
}

type Shared = Arc<Mutex<FakeState>>;

fn track_item(id: &str) -> Value {
    json!({
        "track": {
            "id": id,
            "name": format!("Song {}", id),
            "artists": [{ "name": "Artist" }],
        }
    })
}

async fn saved_tracks(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Shared>,
) -> Json<Value> {
    let mut state = state.lock().await;
    state.saved_requests += 1;

    let offset: usize = params
        .get("offset")
        .and_then(|o| o.parse().ok())
        .unwrap_or(0);
    let end = (offset + state.page_size).min(state.saved.len());
    let items: Vec<Value> = state.saved[offset..end].iter().map(|id| track_item(id)).collect();
    let next = if end < state.saved.len() {
        Value::String(format!("{}/me/tracks?offset={}", state.base_url, end))
    } else {
        Value::Null
    };

    Json(json!({ "items": items, "next": next }))
}

async fn playlist_tracks(
    Path(id): Path<String>,
    Extension(state): Extension<Shared>,
) -> Json<Value> {
    let state = state.lock().await;
    let items: Vec<Value> = state
        .playlists
        .get(&id)
        .map(|tracks| tracks.iter().map(|t| track_item(t)).collect())
        .unwrap_or_default();

    Json(json!({ "items": items, "next": null }))
}

async fn create_playlist(
    Extension(state): Extension<Shared>,
    Json(_body): Json<Value>,
) -> impl IntoResponse {
    let mut state = state.lock().await;
    if state.fail_create {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "internal" })),
        )
            .into_response();
    }

    state.created += 1;
    let id = format!("playlist-{}", state.created);
    state.playlists.insert(id.clone(), Vec::new());
    Json(json!({ "id": id })).into_response()
}

fn uris_to_ids(uris: impl Iterator<Item = String>) -> Vec<String> {
    uris.map(|u| u.trim_start_matches("spotify:track:").to_string())
        .collect()
}

async fn add_tracks(
    Path(id): Path<String>,
    Extension(state): Extension<Shared>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut state = state.lock().await;
    let uris = body["uris"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|u| u.as_str().map(str::to_string));
    let ids = uris_to_ids(uris);

    if let Some(playlist) = state.playlists.get_mut(&id) {
        playlist.extend(ids);
    }
    Json(json!({ "snapshot_id": "snap" })).into_response()
}

async fn remove_tracks(
    Path(id): Path<String>,
    Extension(state): Extension<Shared>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut state = state.lock().await;

    let request_index = state.remove_requests;
    state.remove_requests += 1;
    if state.fail_remove_request == Some(request_index) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "internal" })),
        )
            .into_response();
    }

    let uris = body["tracks"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|t| t["uri"].as_str().map(str::to_string));
    let ids = uris_to_ids(uris);

    if let Some(playlist) = state.playlists.get_mut(&id) {
        playlist.retain(|t| !ids.contains(t));
    }
    Json(json!({ "snapshot_id": "snap" })).into_response()
}

async fn follow() -> StatusCode {
    StatusCode::OK
}

async fn unfollow() -> StatusCode {
    StatusCode::OK
}

async fn token(Extension(state): Extension<Shared>) -> Json<Value> {
    let mut state = state.lock().await;
    state.token_requests += 1;
    Json(json!({
        "access_token": format!("access-{}", state.token_requests),
        "refresh_token": state.rotate_refresh,
        "expires_in": 3600,
    }))
}

async fn start_fake(state: Shared) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    state.lock().await.base_url = base_url.clone();

    let app = Router::new()
        .route("/token", post(token))
        .route("/me/tracks", get(saved_tracks))
        .route("/me/playlists", post(create_playlist))
        .route(
            "/playlists/{id}/tracks",
            get(playlist_tracks).post(add_tracks).delete(remove_tracks),
        )
        .route("/playlists/{id}/followers", put(follow).delete(unfollow))
        .layer(Extension(state));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    base_url
}

fn fake_state(saved_count: usize, page_size: usize) -> Shared {
    Arc::new(Mutex::new(FakeState {
        saved: (0..saved_count).map(|i| format!("track-{:03}", i)).collect(),
        page_size,
        ..FakeState::default()
    }))
}

fn api_for(base_url: &str) -> SpotifyApi {
    SpotifyApi::new(
        base_url.to_string(),
        format!("{}/authorize", base_url),
        format!("{}/token", base_url),
        "client-id".to_string(),
        "client-secret".to_string(),
        "http://127.0.0.1/callback".to_string(),
        "user-library-read".to_string(),
    )
}

async fn temp_registry() -> Arc<PlaylistRegistry> {
    let path = std::env::temp_dir().join(format!(
        "topsongs-test-{}.json",
        utils::generate_session_id()
    ));
    Arc::new(PlaylistRegistry::open(path).await.unwrap())
}

fn session(expires_in: u64, obtained_at: u64) -> Arc<Mutex<Session>> {
    Arc::new(Mutex::new(Session {
        user_id: "user-1".to_string(),
        user_name: "User One".to_string(),
        token: Token {
            access_token: "initial-access".to_string(),
            refresh_token: "initial-refresh".to_string(),
            expires_in,
            obtained_at,
        },
        song_limit: DEFAULT_SONG_LIMIT,
    }))
}

#[tokio::test]
async fn ensure_created_is_idempotent() {
    let fake = fake_state(30, 20);
    let base_url = start_fake(Arc::clone(&fake)).await;
    let api = api_for(&base_url);
    let sync = SyncManager::new(temp_registry().await);

    let first = sync
        .ensure_created(&api, "access", "user-1", 20)
        .await
        .unwrap();
    assert_eq!(first.feedback, "Playlist created successfully!");
    let first_id = first.playlist_id.clone().unwrap();

    let second = sync
        .ensure_created(&api, "access", "user-1", 20)
        .await
        .unwrap();
    assert!(second.feedback.contains("already created"));
    assert_eq!(second.playlist_id.unwrap(), first_id);

    // Only one remote playlist was ever created
    assert_eq!(fake.lock().await.created, 1);
}

#[tokio::test]
async fn distinct_song_counts_get_distinct_playlists() {
    let fake = fake_state(30, 20);
    let base_url = start_fake(Arc::clone(&fake)).await;
    let api = api_for(&base_url);
    let sync = SyncManager::new(temp_registry().await);

    let twenty = sync
        .ensure_created(&api, "access", "user-1", 20)
        .await
        .unwrap();
    let ten = sync
        .ensure_created(&api, "access", "user-1", 10)
        .await
        .unwrap();

    assert_ne!(twenty.playlist_id, ten.playlist_id);
    assert_eq!(fake.lock().await.created, 2);
}

#[tokio::test]
async fn synchronize_replaces_playlist_with_top_n_in_order() {
    let fake = fake_state(250, 20);
    let base_url = start_fake(Arc::clone(&fake)).await;
    let api = api_for(&base_url);
    let sync = SyncManager::new(temp_registry().await);

    let created = sync
        .ensure_created(&api, "access", "user-1", 20)
        .await
        .unwrap();
    let playlist_id = created.playlist_id.unwrap();

    // Pre-existing contents get fully replaced, not merged
    fake.lock().await.playlists.insert(
        playlist_id.clone(),
        vec!["stale-1".to_string(), "stale-2".to_string()],
    );

    let requests_before = fake.lock().await.saved_requests;
    let outcome = sync
        .synchronize(&api, "access", "user-1", 20)
        .await
        .unwrap();
    assert_eq!(outcome.feedback, "Playlist updated successfully!");
    assert_eq!(outcome.playlist_id.unwrap(), playlist_id);

    let state = fake.lock().await;
    let expected: Vec<String> = (0..20).map(|i| format!("track-{:03}", i)).collect();
    assert_eq!(state.playlists[&playlist_id], expected);

    // 250 saved tracks, 20 requested, pages of 20: the first page already
    // satisfies the count, so no follow-up page request is issued.
    assert_eq!(state.saved_requests - requests_before, 1);
}

#[tokio::test]
async fn synchronize_spans_pages_when_count_exceeds_page_size() {
    let fake = fake_state(250, 20);
    let base_url = start_fake(Arc::clone(&fake)).await;
    let api = api_for(&base_url);
    let sync = SyncManager::new(temp_registry().await);

    let created = sync
        .ensure_created(&api, "access", "user-1", 30)
        .await
        .unwrap();
    let playlist_id = created.playlist_id.unwrap();

    let requests_before = fake.lock().await.saved_requests;
    sync.synchronize(&api, "access", "user-1", 30).await.unwrap();

    let state = fake.lock().await;
    assert_eq!(state.playlists[&playlist_id].len(), 30);
    assert_eq!(state.playlists[&playlist_id][29], "track-029");
    assert_eq!(state.saved_requests - requests_before, 2);
}

#[tokio::test]
async fn synchronize_with_short_library_takes_what_exists() {
    let fake = fake_state(7, 20);
    let base_url = start_fake(Arc::clone(&fake)).await;
    let api = api_for(&base_url);
    let sync = SyncManager::new(temp_registry().await);

    let created = sync
        .ensure_created(&api, "access", "user-1", 20)
        .await
        .unwrap();
    let playlist_id = created.playlist_id.unwrap();

    sync.synchronize(&api, "access", "user-1", 20).await.unwrap();

    assert_eq!(fake.lock().await.playlists[&playlist_id].len(), 7);
}

#[tokio::test]
async fn synchronize_without_record_makes_no_remote_calls() {
    let fake = fake_state(30, 20);
    let base_url = start_fake(Arc::clone(&fake)).await;
    let api = api_for(&base_url);
    let sync = SyncManager::new(temp_registry().await);

    let outcome = sync
        .synchronize(&api, "access", "user-1", 20)
        .await
        .unwrap();
    assert_eq!(outcome.feedback, "No playlist found.");
    assert!(outcome.playlist_id.is_none());

    let state = fake.lock().await;
    assert_eq!(state.saved_requests, 0);
    assert_eq!(state.remove_requests, 0);
}

#[tokio::test]
async fn failed_create_persists_nothing_and_retry_succeeds() {
    let fake = fake_state(30, 20);
    let base_url = start_fake(Arc::clone(&fake)).await;
    let api = api_for(&base_url);
    let registry = temp_registry().await;
    let sync = SyncManager::new(Arc::clone(&registry));

    fake.lock().await.fail_create = true;

    let err = sync
        .ensure_created(&api, "access", "user-1", 20)
        .await
        .unwrap_err();
    match err {
        Error::Create { status, .. } => assert_eq!(status, 500),
        other => panic!("expected Create error, got {:?}", other),
    }

    // No stale record blocks the retry
    assert!(registry.find_playlist("user-1", 20).await.is_none());

    fake.lock().await.fail_create = false;
    let outcome = sync
        .ensure_created(&api, "access", "user-1", 20)
        .await
        .unwrap();
    assert_eq!(outcome.feedback, "Playlist created successfully!");
    assert!(registry.find_playlist("user-1", 20).await.is_some());
}

#[tokio::test]
async fn failed_remove_chunk_reports_partial_progress() {
    let fake = fake_state(30, 20);
    let base_url = start_fake(Arc::clone(&fake)).await;
    let api = api_for(&base_url);
    let sync = SyncManager::new(temp_registry().await);

    let created = sync
        .ensure_created(&api, "access", "user-1", 20)
        .await
        .unwrap();
    let playlist_id = created.playlist_id.unwrap();

    // 150 tracks on the remote playlist split into chunks of 100 + 50;
    // the second remove request fails.
    {
        let mut state = fake.lock().await;
        let stale: Vec<String> = (0..150).map(|i| format!("stale-{:03}", i)).collect();
        state.playlists.insert(playlist_id.clone(), stale);
        state.fail_remove_request = Some(1);
    }

    let err = sync
        .synchronize(&api, "access", "user-1", 20)
        .await
        .unwrap_err();
    match err {
        Error::Batch {
            chunk,
            applied,
            status,
            ..
        } => {
            assert_eq!(chunk, 1);
            assert_eq!(applied, 100);
            assert_eq!(status, 500);
        }
        other => panic!("expected Batch error, got {:?}", other),
    }

    // The playlist is left partially cleared; a follow-up synchronize recovers.
    assert_eq!(fake.lock().await.playlists[&playlist_id].len(), 50);

    let outcome = sync
        .synchronize(&api, "access", "user-1", 20)
        .await
        .unwrap();
    assert_eq!(outcome.feedback, "Playlist updated successfully!");
    assert_eq!(fake.lock().await.playlists[&playlist_id].len(), 20);
}

#[tokio::test]
async fn teardown_unfollows_and_forgets_the_playlist() {
    let fake = fake_state(30, 20);
    let base_url = start_fake(Arc::clone(&fake)).await;
    let api = api_for(&base_url);
    let registry = temp_registry().await;
    let sync = SyncManager::new(Arc::clone(&registry));

    sync.ensure_created(&api, "access", "user-1", 20)
        .await
        .unwrap();

    let outcome = sync.teardown(&api, "access", "user-1", 20).await.unwrap();
    assert_eq!(outcome.feedback, "Playlist deleted successfully!");
    assert!(registry.find_playlist("user-1", 20).await.is_none());

    let again = sync.teardown(&api, "access", "user-1", 20).await.unwrap();
    assert!(again.feedback.contains("No playlist found"));
}

#[tokio::test]
async fn valid_token_is_returned_without_network_calls() {
    let fake = fake_state(0, 20);
    let base_url = start_fake(Arc::clone(&fake)).await;
    let api = api_for(&base_url);

    let now = chrono::Utc::now().timestamp() as u64;
    let session = session(3600, now);
    let manager = TokenManager::new(Arc::clone(&session));

    let access = manager.get_valid_token(&api).await.unwrap();
    assert_eq!(access, "initial-access");
    assert_eq!(fake.lock().await.token_requests, 0);
}

#[tokio::test]
async fn expired_token_triggers_exactly_one_refresh() {
    let fake = fake_state(0, 20);
    let base_url = start_fake(Arc::clone(&fake)).await;
    let api = api_for(&base_url);

    let now = chrono::Utc::now().timestamp() as u64;
    let session = session(3600, now - 7200);
    let manager = TokenManager::new(Arc::clone(&session));
    let manager2 = TokenManager::new(Arc::clone(&session));

    // Two concurrent requests discover the expiry; only one refresh call
    // goes out and the second caller reuses its result.
    let (first, second) = tokio::join!(
        manager.get_valid_token(&api),
        manager2.get_valid_token(&api)
    );
    assert_eq!(first.unwrap(), "access-1");
    assert_eq!(second.unwrap(), "access-1");
    assert_eq!(fake.lock().await.token_requests, 1);

    let session = session.lock().await;
    let now = chrono::Utc::now().timestamp() as u64;
    assert!(!session.token.is_expired(now));
    // Provider sent no rotated refresh token, so the old one is retained
    assert_eq!(session.token.refresh_token, "initial-refresh");
}

#[tokio::test]
async fn rotated_refresh_token_replaces_the_old_one() {
    let fake = fake_state(0, 20);
    fake.lock().await.rotate_refresh = Some("rotated-refresh".to_string());
    let base_url = start_fake(Arc::clone(&fake)).await;
    let api = api_for(&base_url);

    let now = chrono::Utc::now().timestamp() as u64;
    let session = session(3600, now - 7200);
    let manager = TokenManager::new(Arc::clone(&session));

    manager.get_valid_token(&api).await.unwrap();
    assert_eq!(session.lock().await.token.refresh_token, "rotated-refresh");
}
