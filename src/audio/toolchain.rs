use std::{
    env,
    path::{Path, PathBuf},
};

use crate::config;

/// Locations of the external tools used by the audio fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub yt_dlp: PathBuf,
    pub ffmpeg: Option<PathBuf>,
}

impl Toolchain {
    pub fn new(yt_dlp: impl Into<PathBuf>, ffmpeg: Option<PathBuf>) -> Self {
        Self {
            yt_dlp: yt_dlp.into(),
            ffmpeg,
        }
    }

    /// Resolves both tools.
    ///
    /// Lookup order per tool:
    /// 1. `YT_DLP_PATH` / `FFMPEG_PATH`
    /// 2. `<data dir>/bin/<tool>`
    /// 3. the directories on `PATH`
    ///
    /// `yt-dlp` falls back to its bare executable name so the OS can still
    /// find it at spawn time. Without an `ffmpeg` location `yt-dlp` uses its
    /// own lookup.
    pub fn resolve() -> Self {
        let bin_dir = config::data_dir().join("bin");

        let yt_dlp = config::yt_dlp_path()
            .or_else(|| find_in_dir(&bin_dir, "yt-dlp"))
            .or_else(|| find_in_path("yt-dlp"))
            .unwrap_or_else(|| PathBuf::from(exe_name("yt-dlp")));

        let ffmpeg = config::ffmpeg_path()
            .or_else(|| find_in_dir(&bin_dir, "ffmpeg"))
            .or_else(|| find_in_path("ffmpeg"));

        Self { yt_dlp, ffmpeg }
    }
}

/// Executable file name for the current platform (`ffmpeg.exe` on Windows).
pub fn exe_name(name: &str) -> String {
    format!("{name}{suffix}", suffix = env::consts::EXE_SUFFIX)
}

pub fn find_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    let candidate = dir.join(exe_name(name));
    candidate.is_file().then_some(candidate)
}

pub fn find_in_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| find_in_dir(&dir, name))
}
