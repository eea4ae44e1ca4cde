use axum::{
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use tokio_util::io::ReaderStream;

use crate::{
    audio::fetcher::AUDIO_FORMAT,
    error::AppError,
    info,
    management::fetch_all,
    server::AppState,
    success,
    types::{
        DownloadAllRequest, DownloadAllResponse, DownloadError, DownloadSongRequest, MusicRecord,
    },
    warning,
};

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Fetches one song and streams the resulting file back as an attachment.
///
/// The file is read in chunks while the response is written, never held in
/// memory as a whole.
pub async fn download_song(
    State(state): State<AppState>,
    payload: Result<Json<DownloadSongRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let query = request
        .query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing query parameter".to_string()))?;

    info!("Received download request for: {}", query);

    let file = state
        .audio
        .fetch_audio(&query)
        .await
        .inspect_err(|e| warning!("Download of '{}' failed: {}", query, e))?;

    let audio = tokio::fs::File::open(&file.path).await?;
    let length = audio.metadata().await?.len();
    let body = Body::from_stream(ReaderStream::new(audio));

    let headers = [
        (header::CONTENT_TYPE, AUDIO_CONTENT_TYPE.to_string()),
        (header::CONTENT_LENGTH, length.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{id}.{ext}\"",
                id = file.content_id,
                ext = AUDIO_FORMAT
            ),
        ),
    ];

    Ok((headers, body).into_response())
}

/// Fetches a list of songs sequentially on the server.
///
/// Per-song failures are reported in `errors`; the request only fails as a
/// whole when the song list itself is invalid.
pub async fn download_all(
    State(state): State<AppState>,
    payload: Result<Json<DownloadAllRequest>, JsonRejection>,
) -> Result<Json<DownloadAllResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let songs: Vec<MusicRecord> = match request.songs {
        Some(Value::Array(items)) if !items.is_empty() => {
            serde_json::from_value(Value::Array(items))
                .map_err(|e| AppError::InvalidInput(format!("Invalid song list: {e}")))?
        }
        _ => return Err(AppError::InvalidInput("Invalid song list".to_string())),
    };

    info!("Received batch download request for {} songs", songs.len());

    let cancel = state.shutdown.child_token();
    let report = fetch_all(state.audio.as_ref(), &songs, &cancel, |progress| {
        info!(
            "Batch progress: {}/{} ({:.0}%)",
            progress.completed,
            progress.total,
            progress.percent()
        )
    })
    .await?;

    success!(
        "Batch finished: {} downloaded, {} failed",
        report.succeeded.len(),
        report.failed.len()
    );

    Ok(Json(DownloadAllResponse {
        downloaded_files: report
            .succeeded
            .iter()
            .map(|s| s.file.path.display().to_string())
            .collect(),
        errors: report
            .failed
            .into_iter()
            .map(|f| DownloadError {
                song: f.record,
                error: f.reason,
            })
            .collect(),
    }))
}
