use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header};
use serde_json::json;

use crate::{
    audio::{AudioSource, fetcher::AUDIO_FORMAT},
    config,
    error::AppError,
    types::{AudioFile, ErrorBody, MusicRecord, ResolveResponse},
    utils,
};

/// HTTP client for the spotfetch backend.
///
/// Implements [`AudioSource`] on top of `POST /download_song`, saving every
/// delivered file into `out_dir`, so the batch orchestrator can drive
/// client-side bulk downloads the same way it drives the local fetcher. A
/// file that cannot be written fails its item like any other error.
pub struct BackendClient {
    client: Client,
    base_url: String,
    out_dir: PathBuf,
}

impl BackendClient {
    pub fn new(client: Client, base_url: impl Into<String>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            out_dir: out_dir.into(),
        }
    }

    pub fn from_env(out_dir: impl Into<PathBuf>) -> Self {
        Self::new(Client::new(), config::backend_url(), out_dir)
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Resolves a Spotify URL through `POST /resolve`.
    pub async fn resolve(&self, url: &str) -> Result<ResolveResponse, AppError> {
        let res = self
            .client
            .post(format!("{}/resolve", self.base_url))
            .json(&json!({ "url": url }))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }

        Ok(res.json::<ResolveResponse>().await?)
    }

    /// Requests `query` from `POST /download_song` and writes the body to
    /// `target`, or to the delivered file name when `target` is `None`.
    async fn download(&self, query: &str, target: Option<PathBuf>) -> Result<AudioFile, AppError> {
        let res = self
            .client
            .post(format!("{}/download_song", self.base_url))
            .json(&json!({ "query": query }))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }

        let delivered = res
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(utils::disposition_filename)
            .map(|name| utils::sanitize_filename(&name))
            .unwrap_or_else(|| format!("{}.{}", utils::sanitize_filename(query), AUDIO_FORMAT));

        let content_id = Path::new(&delivered)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| delivered.clone());
        let path = target.unwrap_or_else(|| self.out_dir.join(&delivered));

        let bytes = res.bytes().await?;
        async_fs::write(&path, &bytes).await?;

        Ok(AudioFile { content_id, path })
    }
}

#[async_trait]
impl AudioSource for BackendClient {
    /// Saves the file under the name the backend delivers, `<content id>.mp3`.
    async fn fetch_audio(&self, query: &str) -> Result<AudioFile, AppError> {
        self.download(query, None).await
    }

    /// Saves the file as `<title> - <artist>.mp3`, so records that match the
    /// same video never share a file.
    async fn fetch_record(&self, record: &MusicRecord) -> Result<AudioFile, AppError> {
        let target = self
            .out_dir
            .join(utils::record_file_name(record, AUDIO_FORMAT));
        self.download(&utils::build_query(record), Some(target)).await
    }
}

/// Maps a non-success backend answer onto the error taxonomy.
async fn error_from_response(res: Response) -> AppError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or_else(|_| status.to_string());

    match status {
        StatusCode::BAD_REQUEST => AppError::InvalidInput(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        _ => AppError::Upstream {
            status: status.as_u16(),
            message,
        },
    }
}
