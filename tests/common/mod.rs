#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use spotlib::{
    config::Config,
    management::{SessionManager, credentials},
    spotify::ApiClient,
    utils,
};
use tokio::net::TcpListener;

pub const PROFILE_NAME: &str = "Test User";
pub const PROFILE_ID: &str = "test-user";

/// Knobs for the fake Spotify service.
#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    pub saved_total: usize,
    pub playlist_total: usize,
    /// Track pages starting at this offset answer 500.
    pub fail_offset: Option<usize>,
    /// Absolute item indexes whose `track` is null.
    pub null_tracks: Vec<usize>,
    /// Include a new refresh token in refresh responses.
    pub rotate_refresh: bool,
    /// Answer `authorization_code` grants with `invalid_grant`.
    pub fail_exchange: bool,
    /// Answer `refresh_token` grants with `invalid_grant`.
    pub fail_refresh: bool,
    /// `total` reported on saved-track pages instead of `saved_total`.
    pub reported_total: Option<usize>,
}

#[derive(Debug, Default)]
pub struct Counters {
    pub exchanges: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub profiles: AtomicUsize,
    pub track_pages: AtomicUsize,
    pub playlist_pages: AtomicUsize,
}

impl Counters {
    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn profiles(&self) -> usize {
        self.profiles.load(Ordering::SeqCst)
    }

    pub fn track_pages(&self) -> usize {
        self.track_pages.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct MockState {
    base: String,
    options: Arc<MockOptions>,
    counters: Arc<Counters>,
}

pub struct MockSpotify {
    pub base: String,
    pub counters: Arc<Counters>,
}

impl MockSpotify {
    pub async fn start(options: MockOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let counters = Arc::new(Counters::default());

        let state = MockState {
            base: base.clone(),
            options: Arc::new(options),
            counters: Arc::clone(&counters),
        };

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/me", get(profile))
            .route("/v1/me/tracks", get(saved_tracks))
            .route("/v1/me/playlists", get(playlists))
            .route("/v1/playlists/{id}", get(playlist))
            .route("/v1/playlists/{id}/tracks", get(playlist_tracks))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base, counters }
    }

    /// Config pointing every endpoint at this mock, with a fresh data dir and
    /// client credential overrides in place.
    pub async fn config(&self) -> Config {
        let config = Config {
            auth_url: "https://accounts.example.test/authorize".to_string(),
            token_url: format!("{}/api/token", self.base),
            api_url: format!("{}/v1", self.base),
            callback_addr: "127.0.0.1:0".to_string(),
            ..Config::default()
        }
        .with_data_dir(temp_data_dir());

        credentials::set_client_id(&config, "test-client-id")
            .await
            .unwrap();
        credentials::set_client_secret(&config, "test-client-secret")
            .await
            .unwrap();
        config
    }
}

/// Plain HTTP client that never routes loopback traffic through a proxy.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn session(config: Config) -> SessionManager {
    SessionManager::with_api_client(config, ApiClient::with_client(http_client()))
}

/// A loopback address that was free a moment ago.
pub fn free_loopback_addr() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

pub fn temp_data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("spotlib-test-{}", utils::random_token(12)))
}

pub fn track_json(index: usize) -> Value {
    json!({
        "id": format!("track-id-{}", index),
        "name": format!("track-{}", index),
        "duration_ms": 180_000,
        "track_number": 1,
        "disc_number": 1,
        "artists": [{
            "id": "artist-1",
            "name": "Artist One",
            "external_urls": { "spotify": "https://open.spotify.com/artist/artist-1" }
        }],
        "album": {
            "id": "album-1",
            "name": "Album One",
            "album_type": "album",
            "release_date": "2024-01-01",
            "total_tracks": 10,
            "images": [{ "url": "https://i.scdn.co/image/large" }],
            "artists": [{ "id": "artist-1", "name": "Artist One" }],
            "external_urls": { "spotify": "https://open.spotify.com/album/album-1" }
        },
        "external_urls": { "spotify": format!("https://open.spotify.com/track/{}", index) },
        "external_ids": { "isrc": format!("ISRC{:05}", index) }
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "))
}

async fn token(State(state): State<MockState>, Form(form): Form<HashMap<String, String>>) -> Response {
    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") => {
            let n = state.counters.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
            if form.get("code_verifier").is_none_or(|v| v.is_empty()) {
                return (StatusCode::BAD_REQUEST, "missing code_verifier").into_response();
            }
            if state.options.fail_exchange {
                return invalid_grant("Invalid authorization code");
            }
            Json(json!({
                "access_token": format!("access-{}", n),
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "refresh-from-exchange",
                "scope": "user-library-read"
            }))
            .into_response()
        }
        Some("refresh_token") => {
            let n = state.counters.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            if state.options.fail_refresh {
                return invalid_grant("Refresh token revoked");
            }
            let mut body = json!({
                "access_token": format!("refreshed-{}", n),
                "token_type": "Bearer",
                "expires_in": 3600,
                "scope": "user-library-read"
            });
            if state.options.rotate_refresh {
                body["refresh_token"] = json!(format!("rotated-{}", n));
            }
            Json(body).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "unsupported_grant_type").into_response(),
    }
}

fn invalid_grant(description: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "invalid_grant", "error_description": description })),
    )
        .into_response()
}

async fn profile(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.counters.profiles.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "id": PROFILE_ID,
        "display_name": PROFILE_NAME,
        "email": "test@example.test",
        "images": [{ "url": "https://i.scdn.co/avatar/large" }, { "url": "https://i.scdn.co/avatar/small" }]
    }))
    .into_response()
}

fn track_page(
    state: &MockState,
    query: &HashMap<String, String>,
    total: usize,
    reported_total: usize,
) -> Response {
    state.counters.track_pages.fetch_add(1, Ordering::SeqCst);

    let limit: usize = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(20);
    let offset: usize = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);

    if state.options.fail_offset == Some(offset) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "page exploded").into_response();
    }

    let items: Vec<Value> = (offset..(offset + limit).min(total))
        .map(|i| {
            if state.options.null_tracks.contains(&i) {
                json!({ "track": null })
            } else {
                json!({ "track": track_json(i) })
            }
        })
        .collect();

    Json(json!({ "items": items, "total": reported_total, "next": null })).into_response()
}

async fn saved_tracks(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let total = state.options.saved_total;
    track_page(&state, &query, total, state.options.reported_total.unwrap_or(total))
}

async fn playlist_tracks(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let total = state.options.playlist_total;
    track_page(&state, &query, total, total)
}

fn playlist_json(id: &str, total: usize) -> Value {
    json!({
        "id": id,
        "name": format!("Playlist {}", id),
        "public": null,
        "images": [{ "url": format!("https://i.scdn.co/playlist/{}", id) }],
        "owner": { "id": PROFILE_ID, "display_name": PROFILE_NAME },
        "tracks": { "total": total }
    })
}

async fn playlists(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.counters.playlist_pages.fetch_add(1, Ordering::SeqCst);

    if query.get("page").map(String::as_str) == Some("2") {
        return Json(json!({
            "items": [playlist_json("p3", 7)],
            "next": null
        }))
        .into_response();
    }

    Json(json!({
        "items": [playlist_json("p1", 3), null, playlist_json("p2", 5)],
        "next": format!("{}/v1/me/playlists?limit=50&page=2", state.base)
    }))
    .into_response()
}

async fn playlist(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(playlist_json(&id, state.options.playlist_total)).into_response()
}
