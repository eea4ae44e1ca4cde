use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    audio::{
        AudioSource,
        runner::{CommandRunner, TokioCommandRunner},
        toolchain::Toolchain,
    },
    config,
    error::AppError,
    info, success,
    types::AudioFile,
    utils,
};

/// Audio container produced by the transcode step.
pub const AUDIO_FORMAT: &str = "mp3";

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Locates a song on YouTube and turns it into an MP3 in the download directory.
///
/// Each fetch is two external invocations of `yt-dlp`:
///
/// 1. **Search**: `ytsearch1:<query>` with `--get-id`, yielding the content
///    identifier of the first hit
/// 2. **Transcode**: `-x --audio-format mp3` against the watch URL, writing
///    `<download_dir>/<id>.mp3`
///
/// When `<id>.mp3` already exists the second step is skipped, so fetching the
/// same identifier twice returns the same file.
pub struct AudioFetcher {
    runner: Arc<dyn CommandRunner>,
    toolchain: Toolchain,
    download_dir: PathBuf,
    search_timeout: Duration,
    transcode_timeout: Duration,
}

impl AudioFetcher {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        toolchain: Toolchain,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            toolchain,
            download_dir: download_dir.into(),
            search_timeout: config::search_timeout(),
            transcode_timeout: config::transcode_timeout(),
        }
    }

    pub fn with_timeouts(mut self, search: Duration, transcode: Duration) -> Self {
        self.search_timeout = search;
        self.transcode_timeout = transcode;
        self
    }

    /// Creates the download directory and returns a ready fetcher.
    pub async fn init(
        runner: Arc<dyn CommandRunner>,
        toolchain: Toolchain,
        download_dir: impl Into<PathBuf>,
    ) -> Result<Self, AppError> {
        let fetcher = Self::new(runner, toolchain, download_dir);
        async_fs::create_dir_all(&fetcher.download_dir).await?;
        Ok(fetcher)
    }

    /// Production setup: real processes, tools resolved from the environment.
    pub async fn from_env() -> Result<Self, AppError> {
        Self::init(
            Arc::new(TokioCommandRunner),
            Toolchain::resolve(),
            config::download_dir(),
        )
        .await
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn output_path(&self, content_id: &str) -> PathBuf {
        self.download_dir.join(format!("{content_id}.{AUDIO_FORMAT}"))
    }

    /// Runs the search step and returns the first content identifier.
    pub async fn search(&self, query: &str) -> Result<String, AppError> {
        let args = vec![
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "--get-id".to_string(),
            format!("ytsearch1:{query}"),
        ];

        let output = self
            .runner
            .run(&self.toolchain.yt_dlp, &args, self.search_timeout)
            .await
            .map_err(|e| AppError::Search(e.to_string()))?;

        if !output.success {
            return Err(AppError::Search(output.error_line()));
        }

        let id = utils::first_content_id(&output.stdout)
            .ok_or_else(|| AppError::NotFound(format!("no video matches '{query}'")))?;

        if !utils::is_valid_content_id(id) {
            return Err(AppError::NotFound(format!(
                "search returned an unusable identifier '{id}'"
            )));
        }

        Ok(id.to_string())
    }

    /// Downloads and converts the content behind `content_id`.
    pub async fn transcode(&self, content_id: &str) -> Result<AudioFile, AppError> {
        let template = self.download_dir.join(format!("{content_id}.%(ext)s"));

        let mut args = vec![
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "-x".to_string(),
            "--audio-format".to_string(),
            AUDIO_FORMAT.to_string(),
        ];
        if let Some(ffmpeg) = &self.toolchain.ffmpeg {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.display().to_string());
        }
        args.push("-o".to_string());
        args.push(template.display().to_string());
        args.push(format!("{WATCH_URL}{content_id}"));

        let output = self
            .runner
            .run(&self.toolchain.yt_dlp, &args, self.transcode_timeout)
            .await
            .map_err(|e| AppError::Transcode(e.to_string()))?;

        if !output.success {
            return Err(AppError::Transcode(output.error_line()));
        }

        let path = self.output_path(content_id);
        if !is_non_empty_file(&path).await {
            return Err(AppError::Transcode(format!(
                "no output written to {}",
                path.display()
            )));
        }

        Ok(AudioFile {
            content_id: content_id.to_string(),
            path,
        })
    }
}

#[async_trait]
impl AudioSource for AudioFetcher {
    async fn fetch_audio(&self, query: &str) -> Result<AudioFile, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("query must not be empty".to_string()));
        }

        info!("Searching YouTube: {}", query);
        let content_id = self.search(query).await?;

        let existing = self.output_path(&content_id);
        if is_non_empty_file(&existing).await {
            info!("Reusing {}", existing.display());
            return Ok(AudioFile {
                content_id,
                path: existing,
            });
        }

        info!("Downloading {}{}", WATCH_URL, content_id);
        let file = self.transcode(&content_id).await?;
        success!("Download complete: {}", file.path.display());
        Ok(file)
    }
}

async fn is_non_empty_file(path: &Path) -> bool {
    async_fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
