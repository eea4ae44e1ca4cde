//! # Audio Module
//!
//! Locates songs on YouTube and converts them to MP3 files by driving the
//! external `yt-dlp` tool (which in turn runs `ffmpeg`).
//!
//! ## Components
//!
//! - [`AudioSource`] - anything that turns a search query into an
//!   [`AudioFile`]; the batch orchestrator only depends on this trait
//! - [`fetcher::AudioFetcher`] - the local implementation backed by `yt-dlp`
//! - [`runner::CommandRunner`] - process-spawn seam, with
//!   [`runner::TokioCommandRunner`] as the production implementation
//! - [`toolchain::Toolchain`] - resolved locations of `yt-dlp` and `ffmpeg`
//!
//! ## Bootstrap
//!
//! Nothing happens at load time. `serve` calls [`fetcher::AudioFetcher::from_env`],
//! which resolves the toolchain and creates the download directory. Tests call
//! [`fetcher::AudioFetcher::init`] with a fake runner and a temporary directory.

use async_trait::async_trait;

use crate::{
    error::AppError,
    types::{AudioFile, MusicRecord},
    utils,
};

pub mod fetcher;
pub mod runner;
pub mod toolchain;

pub use fetcher::AudioFetcher;
pub use runner::{CommandOutput, CommandRunner, RunError, TokioCommandRunner};
pub use toolchain::Toolchain;

/// Turns a free-text query into a local audio file.
#[async_trait]
pub trait AudioSource: Send + Sync {
    async fn fetch_audio(&self, query: &str) -> Result<AudioFile, AppError>;

    /// Fetches the audio for one record, searching with `"{name} {artist} audio"`.
    ///
    /// Sources that store files per record (rather than per content
    /// identifier) override this so the file is complete once it returns.
    async fn fetch_record(&self, record: &MusicRecord) -> Result<AudioFile, AppError> {
        self.fetch_audio(&utils::build_query(record)).await
    }
}
