use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    cli::client::BackendClient,
    error, info,
    types::{MusicRecord, SongTableRow},
    warning,
};

pub async fn list(url: String) {
    let client = BackendClient::from_env(".");

    let pb = spinner("Resolving Spotify URL...");
    let resolved = client.resolve(&url).await;
    pb.finish_and_clear();

    match resolved {
        Ok(resolved) => {
            if resolved.songs.is_empty() {
                warning!("No songs found for {} {}", resolved.kind, resolved.id);
                return;
            }

            info!(
                "Found {} songs in {} {}",
                resolved.songs.len(),
                resolved.kind,
                resolved.id
            );
            println!("{}", song_table(&resolved.songs));
        }
        Err(e) => error!("Failed to resolve {}. Err: {}", url, e),
    }
}

pub(crate) fn song_table(songs: &[MusicRecord]) -> Table {
    let rows: Vec<SongTableRow> = songs
        .iter()
        .enumerate()
        .map(|(i, s)| SongTableRow {
            index: i + 1,
            name: s.name.clone(),
            artists: s.artist.clone(),
        })
        .collect();

    Table::new(rows)
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
