use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{
    config,
    error::AppError,
    spotify::auth::TokenProvider,
    types::{MusicRecord, PlaylistTracksPage, ResourceKind, ResourceReference, SpotifyTrack},
    utils, warning,
};

/// Page size for the playlist items endpoint (the API maximum).
const PLAYLIST_PAGE_LIMIT: u32 = 100;

/// Resolves Spotify tracks and playlists into flat [`MusicRecord`] lists.
#[derive(Clone)]
pub struct CatalogResolver {
    client: Client,
    api_url: String,
    tokens: TokenProvider,
}

impl CatalogResolver {
    pub fn new(client: Client, api_url: impl Into<String>, tokens: TokenProvider) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn from_env(client: Client) -> Self {
        let tokens = TokenProvider::from_env(client.clone());
        Self::new(client, config::spotify_apiurl(), tokens)
    }

    pub fn tokens(&self) -> &TokenProvider {
        &self.tokens
    }

    /// Resolves a reference into its records.
    ///
    /// A fresh credential is acquired for every call. A playlist yields one
    /// record per available entry in upstream order; a track yields exactly
    /// one record, or none when the response cannot be mapped.
    ///
    /// # Errors
    ///
    /// - [`AppError::Auth`] when no credential can be acquired
    /// - [`AppError::Upstream`] when the Web API cannot be reached or answers
    ///   with a non-success status
    /// - [`AppError::MalformedResponse`] when a playlist page or entry has an unexpected shape
    pub async fn resolve_reference(
        &self,
        reference: &ResourceReference,
    ) -> Result<Vec<MusicRecord>, AppError> {
        let credential = self.tokens.acquire_credential().await?;
        let token = &credential.access_token;

        match reference.kind {
            ResourceKind::Playlist => self.get_playlist_tracks(&reference.id, token).await,
            ResourceKind::Track => Ok(self
                .get_track(&reference.id, token)
                .await?
                .into_iter()
                .collect()),
        }
    }

    /// Retrieves every track of a playlist, following the `next` links.
    ///
    /// Entries whose `track` is `null` (removed or unavailable items) and
    /// local files are skipped with a warning. Any other entry that cannot be
    /// mapped fails the whole resolution, so callers never see a partial list
    /// without knowing it.
    pub async fn get_playlist_tracks(
        &self,
        playlist_id: &str,
        token: &str,
    ) -> Result<Vec<MusicRecord>, AppError> {
        let mut records = Vec::new();
        let mut position = 0usize;
        let mut next = Some(format!(
            "{api}/playlists/{playlist_id}/tracks?limit={limit}",
            api = self.api_url,
            limit = PLAYLIST_PAGE_LIMIT
        ));

        while let Some(url) = next {
            let json = self.get_json(&url, token).await?;
            let page: PlaylistTracksPage = serde_json::from_value(json).map_err(|e| {
                AppError::MalformedResponse(format!("playlist page for {playlist_id}: {e}"))
            })?;

            for item in page.items {
                let Some(track) = item.track.filter(|t| !t.is_null()) else {
                    warning!("Skipping unavailable entry #{} in playlist {}", position, playlist_id);
                    position += 1;
                    continue;
                };

                if track["is_local"].as_bool().unwrap_or(false) {
                    warning!(
                        "Skipping local file '{}' in playlist {}",
                        track["name"].as_str().unwrap_or("?"),
                        playlist_id
                    );
                    position += 1;
                    continue;
                }

                let track: SpotifyTrack = serde_json::from_value(track).map_err(|e| {
                    AppError::MalformedResponse(format!(
                        "entry #{position} in playlist {playlist_id}: {e}"
                    ))
                })?;

                records.push(utils::to_music_record(track));
                position += 1;
            }

            next = page.next.filter(|n| !n.is_empty());
        }

        Ok(records)
    }

    /// Retrieves a single track. Returns `None` if the body cannot be mapped.
    pub async fn get_track(
        &self,
        track_id: &str,
        token: &str,
    ) -> Result<Option<MusicRecord>, AppError> {
        let url = format!("{api}/tracks/{track_id}", api = self.api_url);
        let json = self.get_json(&url, token).await?;

        match serde_json::from_value::<SpotifyTrack>(json) {
            Ok(track) => Ok(Some(utils::to_music_record(track))),
            Err(e) => {
                warning!("Track {} could not be mapped: {}", track_id, e);
                Ok(None)
            }
        }
    }

    async fn get_json(&self, url: &str, token: &str) -> Result<Value, AppError> {
        let res = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Upstream {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: format!("web api unreachable: {e}"),
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: upstream_message(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        res.json::<Value>()
            .await
            .map_err(|e| AppError::MalformedResponse(e.to_string()))
    }
}

/// Pulls `error.message` out of a Web API error body.
fn upstream_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json["error"]["message"]
        .as_str()
        .or_else(|| json["error"].as_str())
        .map(str::to_string)
}
