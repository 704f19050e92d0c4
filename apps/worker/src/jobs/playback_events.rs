//! Playback events forwarded to the recommendation engine

use cadence_mood_engine::{SongId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{WorkerError, WorkerResult};
use crate::AppState;

/// A listener skipped a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSkippedJob {
    pub user_id: UserId,
    pub track_id: SongId,
}

/// A listener stopped playback; their session window is closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEndedJob {
    pub user_id: UserId,
}

fn require_positive(field: &str, value: i64) -> WorkerResult<()> {
    if value <= 0 {
        return Err(WorkerError::InvalidPayload(format!(
            "{field} must be positive, got {value}"
        )));
    }
    Ok(())
}

/// Drop the skipped track from the session window
pub async fn execute_skip(state: &AppState, job: &TrackSkippedJob) -> WorkerResult<()> {
    require_positive("user_id", job.user_id)?;
    require_positive("track_id", job.track_id)?;

    let changed = state.engine.skip(job.user_id, job.track_id).await?;
    if !changed {
        tracing::debug!(
            user_id = job.user_id,
            track_id = job.track_id,
            "Skipped track not in session window"
        );
    }
    Ok(())
}

pub async fn execute_session_end(state: &AppState, job: &SessionEndedJob) -> WorkerResult<()> {
    require_positive("user_id", job.user_id)?;

    if !state.engine.end_session(job.user_id).await? {
        tracing::debug!(user_id = job.user_id, "No active session to end");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive("user_id", 1).is_ok());
        let err = require_positive("track_id", -3).unwrap_err();
        assert_eq!(err.to_string(), "invalid payload: track_id must be positive, got -3");
    }
}
