//! Mood backfill job
//!
//! Classifies every catalog song that has no mood record yet, one batch at
//! a time, then logs how the catalog is spread across moods. Songs classified
//! concurrently by next-track requests simply drop out of later batches.

use async_trait::async_trait;
use cadence_mood_engine::{MoodClassifier, MoodCount, SongId, StorageResult, TrackMoodStore};
use serde::{Deserialize, Serialize};

use crate::error::{WorkerError, WorkerResult};
use crate::AppState;

/// Source of songs still waiting for a mood record
#[async_trait]
pub trait UnclassifiedSongs: Send + Sync {
    /// Up to `limit` unclassified song ids, lowest id first
    async fn next_unclassified(&self, limit: usize) -> StorageResult<Vec<SongId>>;
}

/// Backfill job payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackfillJob {
    /// Songs per batch; the worker's configured size when absent
    #[serde(default)]
    pub batch_size: Option<usize>,
}

/// What a backfill run did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackfillSummary {
    pub classified: usize,
    pub batches: usize,
    pub distribution: Vec<MoodCount>,
}

/// Execute the backfill job against the worker's repositories
pub async fn execute(state: &AppState, job: &BackfillJob) -> WorkerResult<BackfillSummary> {
    let batch_size = job.batch_size.unwrap_or(state.config.backfill_batch_size);

    run_backfill(
        &state.songs,
        state.classifier.as_ref(),
        &state.mood_store,
        batch_size,
    )
    .await
}

/// Classify batches until the unclassified pool is exhausted
pub async fn run_backfill(
    pending: &dyn UnclassifiedSongs,
    classifier: &dyn MoodClassifier,
    store: &dyn TrackMoodStore,
    batch_size: usize,
) -> WorkerResult<BackfillSummary> {
    if batch_size == 0 {
        return Err(WorkerError::InvalidPayload(
            "batch_size must be greater than zero".to_string(),
        ));
    }

    let mut classified = 0;
    let mut batches = 0;

    loop {
        let batch = pending.next_unclassified(batch_size).await?;
        if batch.is_empty() {
            break;
        }
        batches += 1;

        for song_id in &batch {
            classifier.classify(*song_id).await?;
        }
        classified += batch.len();

        tracing::debug!(batch = batches, size = batch.len(), classified, "Backfill batch done");

        if batch.len() < batch_size {
            break;
        }
    }

    let distribution = store.distribution().await?;
    for entry in &distribution {
        tracing::info!(mood = %entry.mood, songs = entry.count, "Mood distribution");
    }
    tracing::info!(classified, batches, "Mood backfill finished");

    Ok(BackfillSummary {
        classified,
        batches,
        distribution,
    })
}
