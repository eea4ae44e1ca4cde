use std::{
    collections::HashSet,
    path::PathBuf,
    sync::Mutex,
};

use async_trait::async_trait;
use spotfetch::{
    audio::AudioSource,
    error::AppError,
    management::fetch_all,
    types::{AudioFile, BatchProgress, MusicRecord},
};
use tokio_util::sync::CancellationToken;

/// Audio source that fails for chosen queries and records the call order.
#[derive(Default)]
struct FakeSource {
    failing: HashSet<String>,
    queries: Mutex<Vec<String>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl FakeSource {
    fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| format!("{n} Artist audio")).collect(),
            ..Self::default()
        }
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioSource for FakeSource {
    async fn fetch_audio(&self, query: &str) -> Result<AudioFile, AppError> {
        let count = {
            let mut queries = self.queries.lock().unwrap();
            queries.push(query.to_string());
            queries.len()
        };

        if let Some((after, token)) = &self.cancel_after {
            if count == *after {
                token.cancel();
            }
        }

        if self.failing.contains(query) {
            return Err(AppError::NotFound(format!("no video matches '{query}'")));
        }

        let id = query.replace(' ', "_");
        Ok(AudioFile {
            path: PathBuf::from(format!("/downloads/{id}.mp3")),
            content_id: id,
        })
    }
}

fn songs(n: usize) -> Vec<MusicRecord> {
    (1..=n)
        .map(|i| MusicRecord {
            name: format!("Song{i}"),
            artist: "Artist".to_string(),
            url: String::new(),
        })
        .collect()
}

#[tokio::test]
async fn test_empty_list_is_rejected() {
    let source = FakeSource::default();
    let cancel = CancellationToken::new();

    let result = fetch_all(&source, &[], &cancel, |_| {}).await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert!(source.queries().is_empty());
}

#[tokio::test]
async fn test_failures_do_not_abort_the_batch() {
    let records = songs(6);
    let source = FakeSource::failing(&["Song2", "Song5"]);
    let cancel = CancellationToken::new();

    let report = fetch_all(&source, &records, &cancel, |_| {})
        .await
        .unwrap();

    assert!(!report.cancelled);
    assert_eq!(report.succeeded.len(), 4);
    assert_eq!(report.failed.len(), 2);

    let succeeded: Vec<&str> = report
        .succeeded
        .iter()
        .map(|s| s.record.name.as_str())
        .collect();
    assert_eq!(succeeded, ["Song1", "Song3", "Song4", "Song6"]);

    let failed: Vec<&str> = report.failed.iter().map(|f| f.record.name.as_str()).collect();
    assert_eq!(failed, ["Song2", "Song5"]);
    assert!(report.failed[0].reason.contains("Song2 Artist audio"));

    // every record was attempted once, in input order
    let expected: Vec<String> = records
        .iter()
        .map(|r| format!("{} {} audio", r.name, r.artist))
        .collect();
    assert_eq!(source.queries(), expected);
}

#[tokio::test]
async fn test_progress_is_reported_per_item_and_ends_at_100() {
    let records = songs(3);
    // the last item fails; the batch still reports 100 %
    let source = FakeSource::failing(&["Song3"]);
    let cancel = CancellationToken::new();
    let mut updates: Vec<BatchProgress> = Vec::new();

    fetch_all(&source, &records, &cancel, |p| updates.push(p))
        .await
        .unwrap();

    let completed: Vec<usize> = updates.iter().map(|p| p.completed).collect();
    assert_eq!(completed, [1, 2, 3]);
    assert!(updates.iter().all(|p| p.total == 3));

    let percents: Vec<f64> = updates.iter().map(BatchProgress::percent).collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert!((percents[0] - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(percents.last().copied(), Some(100.0));
}

#[tokio::test]
async fn test_cancellation_stops_before_next_item() {
    let records = songs(5);
    let cancel = CancellationToken::new();
    let source = FakeSource {
        cancel_after: Some((2, cancel.clone())),
        ..FakeSource::default()
    };
    let mut updates = 0;

    let report = fetch_all(&source, &records, &cancel, |_| updates += 1)
        .await
        .unwrap();

    assert!(report.cancelled);
    // the running item finishes, nothing after it starts
    assert_eq!(report.succeeded.len(), 2);
    assert!(report.failed.is_empty());
    assert_eq!(source.queries().len(), 2);
    assert_eq!(updates, 2);
}

#[tokio::test]
async fn test_cancelled_token_attempts_nothing() {
    let records = songs(3);
    let source = FakeSource::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = fetch_all(&source, &records, &cancel, |_| {}).await.unwrap();

    assert!(report.cancelled);
    assert!(report.succeeded.is_empty());
    assert!(report.failed.is_empty());
    assert!(source.queries().is_empty());
}
