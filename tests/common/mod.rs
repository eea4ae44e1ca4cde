#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    Form, Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Value, json};
use spotfetch::{
    audio::{CommandOutput, CommandRunner, RunError},
    server::{AppState, build_router},
};

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const ACCESS_TOKEN: &str = "fake-access-token";
pub const WEB_ACCESS_TOKEN: &str = "fake-web-token";

/// Scripted stand-in for `yt-dlp`.
///
/// Search answers come from `ids` (query -> content id); unknown queries
/// produce empty output. Transcodes write `audio:<id>` to the `-o` target.
#[derive(Default)]
pub struct FakeRunner {
    pub ids: HashMap<String, String>,
    pub failing_transcodes: HashSet<String>,
    pub search_fails: bool,
    pub skip_output: bool,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_song(mut self, query: &str, id: &str) -> Self {
        self.ids.insert(query.to_string(), id.to_string());
        self
    }

    pub fn failing_transcode(mut self, id: &str) -> Self {
        self.failing_transcodes.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn transcode_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|args| args.iter().any(|a| a == "-x"))
            .count()
    }
}

pub fn fake_audio_bytes(id: &str) -> Vec<u8> {
    format!("audio:{id}").into_bytes()
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(
        &self,
        _program: &Path,
        args: &[String],
        _timeout: Duration,
    ) -> Result<CommandOutput, RunError> {
        self.calls.lock().unwrap().push(args.to_vec());

        if args.iter().any(|a| a == "--get-id") {
            if self.search_fails {
                return Ok(CommandOutput {
                    success: false,
                    code: Some(1),
                    stdout: String::new(),
                    stderr: "ERROR: unable to reach youtube\n".to_string(),
                });
            }

            let query = args
                .last()
                .and_then(|a| a.strip_prefix("ytsearch1:"))
                .unwrap_or_default();
            let stdout = self
                .ids
                .get(query)
                .map(|id| format!("{id}\n"))
                .unwrap_or_default();

            return Ok(CommandOutput {
                success: true,
                code: Some(0),
                stdout,
                stderr: String::new(),
            });
        }

        let url = args.last().cloned().unwrap_or_default();
        let id = url.rsplit("v=").next().unwrap_or_default().to_string();

        if self.failing_transcodes.contains(&id) {
            return Ok(CommandOutput {
                success: false,
                code: Some(1),
                stdout: String::new(),
                stderr: "ERROR: Postprocessing: ffmpeg exited with code 1\n".to_string(),
            });
        }

        if !self.skip_output {
            let template = args
                .iter()
                .position(|a| a == "-o")
                .and_then(|i| args.get(i + 1))
                .expect("transcode call carries -o");
            let target = template.replace("%(ext)s", "mp3");
            std::fs::write(target, fake_audio_bytes(&id)).unwrap();
        }

        Ok(CommandOutput {
            success: true,
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// In-process Spotify accounts service and Web API.
pub struct FakeSpotify {
    pub base: String,
    pub token_requests: AtomicUsize,
}

impl FakeSpotify {
    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn api_url(&self) -> String {
        format!("{}/v1", self.base)
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.base)
    }

    pub fn web_token_url(&self) -> String {
        format!("{}/get_access_token", self.base)
    }
}

pub async fn spawn_fake_spotify() -> Arc<FakeSpotify> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let state = Arc::new(FakeSpotify {
        base,
        token_requests: AtomicUsize::new(0),
    });

    let app = Router::new()
        .route("/api/token", post(token))
        .route("/get_access_token", get(web_token))
        .route("/v1/tracks/{id}", get(track))
        .route("/v1/playlists/{id}/tracks", get(playlist_tracks))
        .with_state(Arc::clone(&state));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    state
}

/// Serves the backend router on an ephemeral port and returns its base URL.
pub async fn spawn_backend(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    base
}

/// A base URL nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn track_json(name: &str, artists: &[&str], id: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "artists": artists.iter().map(|a| json!({ "name": a })).collect::<Vec<_>>(),
        "external_urls": { "spotify": format!("https://open.spotify.com/track/{id}") },
        "is_local": false,
    })
}

async fn token(
    State(state): State<Arc<FakeSpotify>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_requests.fetch_add(1, Ordering::SeqCst);

    let expected = format!(
        "Basic {}",
        STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}"))
    );
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());

    if !authorized || form.get("grant_type").map(String::as_str) != Some("client_credentials") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response();
    }

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3600,
    }))
    .into_response()
}

async fn web_token(State(state): State<Arc<FakeSpotify>>, headers: HeaderMap) -> Response {
    state.token_requests.fetch_add(1, Ordering::SeqCst);

    let browser = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ua| ua.starts_with("Mozilla/5.0"));
    if !browser {
        return StatusCode::FORBIDDEN.into_response();
    }

    let expires = chrono::Utc::now().timestamp_millis() + 3_600_000;
    Json(json!({
        "clientId": "web",
        "accessToken": WEB_ACCESS_TOKEN,
        "accessTokenExpirationTimestampMs": expires,
        "isAnonymous": true,
    }))
    .into_response()
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {ACCESS_TOKEN}") || v == format!("Bearer {WEB_ACCESS_TOKEN}"))
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": { "status": 404, "message": "Resource not found" } })),
    )
        .into_response()
}

async fn track(headers: HeaderMap, UrlPath(id): UrlPath<String>) -> Response {
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match id.as_str() {
        "badhabit" => Json(track_json("Bad Habit", &["Steve Lacy"], "badhabit")).into_response(),
        "collab" => Json(track_json("Kill Bill", &["SZA", "Doja Cat"], "collab")).into_response(),
        "unmappable" => Json(json!({ "id": "unmappable", "type": "episode" })).into_response(),
        _ => not_found(),
    }
}

async fn playlist_tracks(
    State(state): State<Arc<FakeSpotify>>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let offset = query
        .get("offset")
        .and_then(|o| o.parse::<usize>().ok())
        .unwrap_or(0);

    match (id.as_str(), offset) {
        ("paged", 0) => Json(json!({
            "items": [
                { "track": track_json("First", &["Artist A"], "t1") },
                { "track": track_json("Second", &["Artist B", "Artist C"], "t2") },
            ],
            "next": format!("{}/v1/playlists/paged/tracks?offset=2&limit=100", state.base),
        }))
        .into_response(),
        ("paged", _) => Json(json!({
            "items": [
                { "track": null },
                { "track": track_json("Third", &["Artist D"], "t3") },
                { "track": {
                    "name": "Home Recording",
                    "artists": [{ "name": "Me" }],
                    "external_urls": {},
                    "is_local": true,
                } },
            ],
            "next": null,
        }))
        .into_response(),
        ("broken", _) => Json(json!({
            "items": [
                { "track": track_json("Fine", &["Artist A"], "t1") },
                { "track": { "artists": [{ "name": "No Title" }] } },
            ],
            "next": null,
        }))
        .into_response(),
        ("empty", _) => Json(json!({ "items": [], "next": null })).into_response(),
        _ => not_found(),
    }
}
