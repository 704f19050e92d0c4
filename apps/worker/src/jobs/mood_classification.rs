//! Single-song mood classification job
//!
//! Without `force` this is the memoized path: an existing record is returned
//! untouched. With `force` the song's genre is read again and the stored
//! record overwritten.

use cadence_mood_engine::{MoodClassifier, SongId};
use serde::{Deserialize, Serialize};

use crate::error::{WorkerError, WorkerResult};
use crate::AppState;

/// Mood classification job payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyTrackJob {
    /// Song to classify
    pub song_id: SongId,
    /// Re-classify even if a mood record exists
    #[serde(default)]
    pub force: bool,
}

impl ClassifyTrackJob {
    pub fn validate(&self) -> WorkerResult<()> {
        if self.song_id <= 0 {
            return Err(WorkerError::InvalidPayload(format!(
                "song_id must be positive, got {}",
                self.song_id
            )));
        }
        Ok(())
    }
}

/// Execute the classification job
pub async fn execute(state: &AppState, job: &ClassifyTrackJob) -> WorkerResult<()> {
    job.validate()?;

    let mood = if job.force {
        state.classifier.reclassify(job.song_id).await?
    } else {
        state.classifier.classify(job.song_id).await?
    };

    tracing::info!(song_id = job.song_id, force = job.force, mood = %mood, "Song classified");
    Ok(())
}
