use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use crate::{
    audio::AudioSource,
    cli::{
        client::BackendClient,
        interrupt::spawn_interrupt_handler,
        list::{song_table, spinner},
    },
    error, info,
    management::fetch_all,
    success,
    types::MusicRecord,
    warning,
};

/// Resolves `url` and downloads the selected rows, or every row.
///
/// `tracks` holds 1-based row numbers as printed by `spotfetch list`. With no
/// rows selected the whole list goes through the batch orchestrator with a
/// progress bar; Ctrl-C stops the batch before the next song starts. Every
/// file is saved as `<title> - <artist>.mp3` as soon as it arrives.
pub async fn download(url: String, tracks: Vec<usize>, out: Option<PathBuf>) {
    let out_dir = out.unwrap_or_else(|| PathBuf::from("."));
    if let Err(e) = async_fs::create_dir_all(&out_dir).await {
        error!("Cannot create {}. Err: {}", out_dir.display(), e);
    }

    let client = BackendClient::from_env(&out_dir);

    let pb = spinner("Resolving Spotify URL...");
    let resolved = client.resolve(&url).await;
    pb.finish_and_clear();

    let songs = match resolved {
        Ok(r) => r.songs,
        Err(e) => error!("Failed to resolve {}. Err: {}", url, e),
    };

    if songs.is_empty() {
        warning!("Nothing to download.");
        return;
    }

    println!("{}", song_table(&songs));

    if tracks.is_empty() {
        download_all(&client, &songs).await;
    } else {
        download_selected(&client, &songs, &tracks).await;
    }
}

async fn download_selected(client: &BackendClient, songs: &[MusicRecord], tracks: &[usize]) {
    for &row in tracks {
        let Some(song) = row.checked_sub(1).and_then(|i| songs.get(i)) else {
            warning!("There is no row {} (1-{})", row, songs.len());
            continue;
        };

        let pb = spinner(&format!("Downloading {} - {}...", song.name, song.artist));
        let result = client.fetch_record(song).await;
        pb.finish_and_clear();

        match result {
            Ok(file) => success!("Saved {}", file.path.display()),
            Err(e) => warning!("Failed to download '{}': {}", song.name, e),
        }
    }
}

async fn download_all(client: &BackendClient, songs: &[MusicRecord]) {
    let cancel = CancellationToken::new();
    let watcher = spawn_interrupt_handler(cancel.clone());

    let pb = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.green/blue} {pos:>3}% {msg}") {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(format!("0/{}", songs.len()));

    let result = fetch_all(client, songs, &cancel, |progress| {
        pb.set_position(progress.percent().round() as u64);
        pb.set_message(format!("{}/{}", progress.completed, progress.total));
    })
    .await;

    pb.finish_and_clear();
    watcher.abort();

    let report = match result {
        Ok(report) => report,
        Err(e) => error!("Batch download failed. Err: {}", e),
    };

    for failed in &report.failed {
        warning!("{} - {}: {}", failed.record.name, failed.record.artist, failed.reason);
    }

    if report.cancelled {
        warning!(
            "Cancelled: {} of {} songs attempted",
            report.succeeded.len() + report.failed.len(),
            songs.len()
        );
    }

    success!(
        "{} downloaded, {} failed, saved to {}",
        report.succeeded.len(),
        report.failed.len(),
        client.out_dir().display()
    );

    if !report.failed.is_empty() {
        info!("Retry single songs with --track <row>.");
    }
}
