//! Configuration management for spotfetch.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including Spotify API credentials, server settings, the download
//! directory and the location of the external tools.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::spotify::auth::TokenStrategy;

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:4000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_BACKEND_URL: &str = "http://localhost:4000";
const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_SPOTIFY_WEB_TOKEN_URL: &str = "https://open.spotify.com/get_access_token";
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TRANSCODE_TIMEOUT_SECS: u64 = 600;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `spotfetch/.env`.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/spotfetch/.env`
/// - macOS: `~/Library/Application Support/spotfetch/.env`
/// - Windows: `%LOCALAPPDATA%/spotfetch/.env`
///
/// A missing `.env` file is not an error; every setting can also come from
/// the process environment.
///
/// # Errors
///
/// This function will return an error if:
/// - The parent directory cannot be created
/// - The `.env` file exists but cannot be read or parsed
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Returns the platform-specific data directory of the application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotfetch");
    path
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn secs_or(key: &str, default: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default);
    Duration::from_secs(secs)
}

/// Returns the address the HTTP backend binds to.
///
/// Reads `SERVER_ADDRESS`, defaulting to `127.0.0.1:4000`.
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Returns the origin allowed to call the backend cross-origin.
///
/// Reads `CORS_ORIGIN`, defaulting to `http://localhost:5173`.
pub fn cors_origin() -> String {
    var_or("CORS_ORIGIN", DEFAULT_CORS_ORIGIN)
}

/// Returns the base URL the terminal client talks to.
///
/// Reads `BACKEND_URL`, defaulting to `http://localhost:4000`.
pub fn backend_url() -> String {
    var_or("BACKEND_URL", DEFAULT_BACKEND_URL)
}

/// Returns the Spotify API client ID for the client-credentials flow.
///
/// Retrieves the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable which
/// contains the client ID obtained when registering the application with
/// Spotify's developer platform.
pub fn spotify_client_id() -> Option<String> {
    non_empty_var("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Returns the Spotify API client secret for the client-credentials flow.
///
/// # Security Note
///
/// The client secret should be kept confidential and never exposed in logs
/// or version control.
pub fn spotify_client_secret() -> Option<String> {
    non_empty_var("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Returns the configured token strategy.
///
/// Reads `SPOTIFY_TOKEN_STRATEGY` (`client_credentials` or `web_player`).
/// Unknown values fall back to client credentials.
pub fn token_strategy() -> TokenStrategy {
    match var_or("SPOTIFY_TOKEN_STRATEGY", "client_credentials")
        .to_lowercase()
        .as_str()
    {
        "web_player" | "web-player" | "webplayer" => TokenStrategy::WebPlayer {
            token_url: spotify_web_token_url(),
        },
        _ => TokenStrategy::ClientCredentials {
            client_id: spotify_client_id(),
            client_secret: spotify_client_secret(),
            token_url: spotify_apitoken_url(),
        },
    }
}

/// Returns the Spotify Web API base URL, e.g. `https://api.spotify.com/v1`.
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL)
}

/// Returns the Spotify accounts token URL used for the client-credentials exchange.
pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_TOKEN_URL)
}

/// Returns the public web-player token endpoint.
pub fn spotify_web_token_url() -> String {
    var_or("SPOTIFY_WEB_TOKEN_URL", DEFAULT_SPOTIFY_WEB_TOKEN_URL)
}

/// Returns the directory audio files are written to.
///
/// Reads `DOWNLOAD_DIR`, defaulting to `<data dir>/downloads`.
pub fn download_dir() -> PathBuf {
    non_empty_var("DOWNLOAD_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir().join("downloads"))
}

/// Explicit `yt-dlp` location from `YT_DLP_PATH`, if set.
pub fn yt_dlp_path() -> Option<PathBuf> {
    non_empty_var("YT_DLP_PATH").map(PathBuf::from)
}

/// Explicit `ffmpeg` location from `FFMPEG_PATH`, if set.
pub fn ffmpeg_path() -> Option<PathBuf> {
    non_empty_var("FFMPEG_PATH").map(PathBuf::from)
}

/// Upper bound for one search invocation (`SEARCH_TIMEOUT_SECS`, default 60).
pub fn search_timeout() -> Duration {
    secs_or("SEARCH_TIMEOUT_SECS", DEFAULT_SEARCH_TIMEOUT_SECS)
}

/// Upper bound for one download+transcode invocation (`TRANSCODE_TIMEOUT_SECS`, default 600).
pub fn transcode_timeout() -> Duration {
    secs_or("TRANSCODE_TIMEOUT_SECS", DEFAULT_TRANSCODE_TIMEOUT_SECS)
}
