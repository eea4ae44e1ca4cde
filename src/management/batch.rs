use tokio_util::sync::CancellationToken;

use crate::{
    audio::AudioSource,
    error::AppError,
    types::{BatchProgress, FailedRecord, FetchReport, FetchedRecord, MusicRecord},
    warning,
};

/// Fetches audio for every record, strictly one after another.
///
/// Each record goes through [`AudioSource::fetch_record`], which searches for
/// `"{name} {artist} audio"` unless the source stores files per record.
/// A failing item is recorded in [`FetchReport::failed`] with its reason and
/// the loop moves on; one failure never aborts the batch. `on_progress` is
/// called after every attempted item, so the final call always reports 100 %.
///
/// `cancel` is checked before each item starts. Once it fires no further item
/// is attempted and the report is returned with `cancelled` set; an item that
/// is already running is allowed to finish.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for an empty record list.
pub async fn fetch_all<S, F>(
    source: &S,
    records: &[MusicRecord],
    cancel: &CancellationToken,
    mut on_progress: F,
) -> Result<FetchReport, AppError>
where
    S: AudioSource + ?Sized,
    F: FnMut(BatchProgress),
{
    if records.is_empty() {
        return Err(AppError::InvalidInput(
            "song list must not be empty".to_string(),
        ));
    }

    let total = records.len();
    let mut report = FetchReport::default();

    for (index, record) in records.iter().enumerate() {
        if cancel.is_cancelled() {
            warning!("Batch cancelled after {} of {} songs", index, total);
            report.cancelled = true;
            break;
        }

        match source.fetch_record(record).await {
            Ok(file) => report.succeeded.push(FetchedRecord {
                record: record.clone(),
                file,
            }),
            Err(e) => {
                warning!("Failed to fetch '{}': {}", record.name, e);
                report.failed.push(FailedRecord {
                    record: record.clone(),
                    reason: e.to_string(),
                });
            }
        }

        on_progress(BatchProgress {
            completed: index + 1,
            total,
        });
    }

    Ok(report)
}
