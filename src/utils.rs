use std::sync::LazyLock;

use regex::Regex;

use crate::{
    error::AppError,
    types::{MusicRecord, ResourceKind, ResourceReference, SpotifyTrack},
};

static SPOTIFY_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://open\.spotify\.com/(?:intl-[A-Za-z-]+/)?(?:embed/)?(?:user/[^/?#]+/)?(?P<web_kind>track|playlist)/(?P<web_id>[0-9A-Za-z]+)(?:[/?#].*)?|spotify:(?:user:[^:]+:)?(?P<uri_kind>track|playlist):(?P<uri_id>[0-9A-Za-z]+))$",
    )
    .expect("spotify reference pattern is valid")
});

static CONTENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("content id pattern is valid"));

/// Parses a Spotify web URL or `spotify:` URI into a track or playlist reference.
///
/// Accepted shapes:
/// - `https://open.spotify.com/track/<id>` (optionally with `intl-xx/` or `embed/`)
/// - `https://open.spotify.com/playlist/<id>?si=...`
/// - `https://open.spotify.com/user/<name>/playlist/<id>`
/// - `spotify:track:<id>`, `spotify:playlist:<id>`, `spotify:user:<name>:playlist:<id>`
///
/// Everything else is rejected with [`AppError::InvalidInput`].
pub fn parse_reference(input: &str) -> Result<ResourceReference, AppError> {
    let input = input.trim();
    let captures = SPOTIFY_REFERENCE
        .captures(input)
        .ok_or_else(|| AppError::InvalidInput(format!("not a spotify track or playlist: {input}")))?;

    let (kind, id) = match (captures.name("web_kind"), captures.name("web_id")) {
        (Some(kind), Some(id)) => (kind, id),
        _ => match (captures.name("uri_kind"), captures.name("uri_id")) {
            (Some(kind), Some(id)) => (kind, id),
            _ => {
                return Err(AppError::InvalidInput(format!(
                    "not a spotify track or playlist: {input}"
                )));
            }
        },
    };

    let kind = match kind.as_str() {
        "track" => ResourceKind::Track,
        _ => ResourceKind::Playlist,
    };

    Ok(ResourceReference {
        kind,
        id: id.as_str().to_string(),
    })
}

/// Search query used for a record: `"{name} {artist} audio"`.
pub fn build_query(record: &MusicRecord) -> String {
    format!("{} {} audio", record.name, record.artist)
}

pub fn join_artists(track: &SpotifyTrack) -> String {
    track
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn to_music_record(track: SpotifyTrack) -> MusicRecord {
    MusicRecord {
        artist: join_artists(&track),
        name: track.name,
        url: track.external_urls.spotify,
    }
}

/// Returns the first non-empty line of the search tool's output.
pub fn first_content_id(stdout: &str) -> Option<&str> {
    stdout.lines().map(str::trim).find(|line| !line.is_empty())
}

/// Content identifiers end up in file names, so only `[A-Za-z0-9_-]` is accepted.
pub fn is_valid_content_id(id: &str) -> bool {
    CONTENT_ID.is_match(id)
}

/// Replaces characters that are not allowed in file names on common platforms.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.').trim();
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// File name a record is saved under on the client side.
pub fn record_file_name(record: &MusicRecord, extension: &str) -> String {
    format!(
        "{} - {}.{}",
        sanitize_filename(&record.name),
        sanitize_filename(&record.artist),
        extension
    )
}

/// Extracts `filename` from a `Content-Disposition` header value.
pub fn disposition_filename(header: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|part| {
        part.strip_prefix("filename=")
            .map(|name| name.trim_matches('"').to_string())
            .filter(|name| !name.is_empty())
    })
}
