//! Background job definitions and handlers
//!
//! Jobs arrive on the Redis queue as JSON objects tagged by `type`:
//! - `classify_track`: classify one song, or force a re-classification
//! - `backfill`: classify every catalog song without a mood record
//! - `track_skipped` / `session_ended`: playback events for the engine

pub mod mood_backfill;
pub mod mood_classification;
pub mod playback_events;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::error::{JobResult, WorkerError, WorkerResult};
use crate::AppState;

pub use mood_backfill::{BackfillJob, BackfillSummary, UnclassifiedSongs};
pub use mood_classification::ClassifyTrackJob;
pub use playback_events::{SessionEndedJob, TrackSkippedJob};

/// A job consumed from the mood queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoodJob {
    ClassifyTrack(ClassifyTrackJob),
    Backfill(BackfillJob),
    TrackSkipped(TrackSkippedJob),
    SessionEnded(SessionEndedJob),
}

impl MoodJob {
    /// Parse a raw queue payload
    pub fn from_payload(payload: &str) -> WorkerResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Job type name used in logs and job results
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClassifyTrack(_) => "classify_track",
            Self::Backfill(_) => "backfill",
            Self::TrackSkipped(_) => "track_skipped",
            Self::SessionEnded(_) => "session_ended",
        }
    }
}

/// Run one job under the configured job timeout
pub async fn dispatch(state: &AppState, job: &MoodJob) -> JobResult {
    let started = Instant::now();
    let limit = state.config.job_timeout();

    let outcome = match timeout(limit, run(state, job)).await {
        Ok(result) => result,
        Err(_) => Err(WorkerError::Timeout {
            seconds: limit.as_secs(),
        }),
    };

    let duration_ms = started.elapsed().as_millis() as u64;
    match outcome {
        Ok(()) => {
            tracing::info!(job = job.name(), duration_ms, "Job completed");
            JobResult::success(job.name(), duration_ms)
        }
        Err(err) => {
            err.log();
            JobResult::from_error(job.name(), &err, duration_ms)
        }
    }
}

/// Parse and run a raw payload; malformed payloads are reported, not retried
pub async fn handle_payload(state: &AppState, payload: &str) -> JobResult {
    match MoodJob::from_payload(payload) {
        Ok(job) => dispatch(state, &job).await,
        Err(err) => {
            err.log();
            JobResult::from_error("unknown", &err, 0)
        }
    }
}

async fn run(state: &AppState, job: &MoodJob) -> WorkerResult<()> {
    match job {
        MoodJob::ClassifyTrack(job) => mood_classification::execute(state, job).await,
        MoodJob::Backfill(job) => mood_backfill::execute(state, job).await.map(|_| ()),
        MoodJob::TrackSkipped(job) => playback_events::execute_skip(state, job).await,
        MoodJob::SessionEnded(job) => playback_events::execute_session_end(state, job).await,
    }
}
