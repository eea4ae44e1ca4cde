use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One resolved song: title, comma-joined artist names and its Spotify link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicRecord {
    pub name: String,
    pub artist: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Track,
    Playlist,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Track => write!(f, "track"),
            ResourceKind::Playlist => write!(f, "playlist"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    pub kind: ResourceKind,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub expires_in: Option<u64>,
    pub obtained_at: i64,
}

/// An audio file in the download directory, named by its content identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFile {
    pub content_id: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedRecord {
    pub record: MusicRecord,
    pub file: AudioFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedRecord {
    pub record: MusicRecord,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchReport {
    pub succeeded: Vec<FetchedRecord>,
    pub failed: Vec<FailedRecord>,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed as f64 / self.total as f64) * 100.0
    }
}

// Spotify accounts service

#[derive(Debug, Clone, Deserialize)]
pub struct ClientCredentialsResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebPlayerTokenResponse {
    pub access_token: Option<String>,
    pub access_token_expiration_timestamp_ms: Option<i64>,
}

// Spotify Web API

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracksPage {
    pub items: Vec<PlaylistItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub name: String,
    pub artists: Vec<TrackArtist>,
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalUrls {
    pub spotify: String,
}

// Backend HTTP API

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub kind: ResourceKind,
    pub id: String,
    pub songs: Vec<MusicRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSongRequest {
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadAllRequest {
    pub songs: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadAllResponse {
    pub downloaded_files: Vec<String>,
    pub errors: Vec<DownloadError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadError {
    pub song: MusicRecord,
    pub error: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Tabled)]
pub struct SongTableRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub name: String,
    pub artists: String,
}
