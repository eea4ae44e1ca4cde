use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    Res,
    api,
    audio::{AudioFetcher, AudioSource},
    config,
    error::AppError,
    spotify::CatalogResolver,
    info, success, warning,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogResolver>,
    pub audio: Arc<dyn AudioSource>,
    /// Fires on shutdown; running batches stop before their next song.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(catalog: CatalogResolver, audio: Arc<dyn AudioSource>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            audio,
            shutdown: CancellationToken::new(),
        }
    }

    /// Production wiring: resolves the toolchain, creates the download
    /// directory and builds the Spotify client from configuration.
    pub async fn from_env() -> Result<Self, AppError> {
        let client = Client::new();
        let catalog = CatalogResolver::from_env(client);
        let fetcher = AudioFetcher::from_env().await?;
        info!("Using yt-dlp at {}", fetcher.toolchain().yt_dlp.display());
        match &fetcher.toolchain().ffmpeg {
            Some(ffmpeg) => info!("Using ffmpeg at {}", ffmpeg.display()),
            None => warning!("ffmpeg not found, yt-dlp will look for it on its own"),
        }
        info!("Saving audio to {}", fetcher.download_dir().display());
        Ok(Self::new(catalog, Arc::new(fetcher)))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/get_spotify_token", get(api::get_spotify_token))
        .route("/resolve", post(api::resolve))
        .route("/download_song", post(api::download_song))
        .route("/download_all", post(api::download_all))
        .layer(cors_layer(&config::cors_origin()))
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]);

    if origin == "*" {
        return layer.allow_origin(Any);
    }

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(e) => {
            warning!("Ignoring invalid CORS_ORIGIN '{}': {}", origin, e);
            layer
        }
    }
}

/// Binds the configured address and serves until `state.shutdown` fires.
pub async fn start_api_server(state: AppState) -> Res<()> {
    let addr = SocketAddr::from_str(&config::server_addr())?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let shutdown = state.shutdown.clone();
    success!("Server running at http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}
