//! Session tracker
//!
//! Maintains each listener's rolling window of recently played track ids and
//! derives the dominant mood that the next pick should stay close to.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use crate::classifier::MoodClassifier;
use crate::error::StorageResult;
use crate::models::{ContextType, SessionContext, SongId, UserId, MOOD_WINDOW};
use crate::mood::{MoodLabel, DEFAULT_MOOD};
use crate::store::{IoDeadline, SessionStore};

/// Reads and mutates the single active session of each user
#[derive(Clone)]
pub struct SessionTracker {
    classifier: Arc<dyn MoodClassifier>,
    sessions: Arc<dyn SessionStore>,
    deadline: IoDeadline,
}

impl SessionTracker {
    pub fn new(classifier: Arc<dyn MoodClassifier>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            classifier,
            sessions,
            deadline: IoDeadline::none(),
        }
    }

    pub fn with_deadline(mut self, deadline: IoDeadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// Moods of the last [`MOOD_WINDOW`] tracks, oldest first
    pub async fn recent_moods(&self, recent_track_ids: &[SongId]) -> StorageResult<Vec<MoodLabel>> {
        let start = recent_track_ids.len().saturating_sub(MOOD_WINDOW);
        let mut moods = Vec::with_capacity(recent_track_ids.len() - start);
        for track_id in &recent_track_ids[start..] {
            moods.push(self.classifier.classify(*track_id).await?);
        }
        Ok(moods)
    }

    /// Most frequent mood among the last [`MOOD_WINDOW`] tracks.
    ///
    /// Ties go to the mood that reached the winning count first; an empty
    /// window yields [`DEFAULT_MOOD`].
    pub async fn dominant_mood(&self, recent_track_ids: &[SongId]) -> StorageResult<MoodLabel> {
        let moods = self.recent_moods(recent_track_ids).await?;
        Ok(most_frequent(&moods))
    }

    pub async fn active_session(&self, user_id: UserId) -> StorageResult<Option<SessionContext>> {
        self.deadline
            .run("load active session", self.sessions.find_active(user_id))
            .await
    }

    /// Append a played track to the user's active session, opening one if needed.
    ///
    /// `dominant_mood` is the session mood the track was chosen against.
    #[instrument(skip(self))]
    pub async fn record_played(
        &self,
        user_id: UserId,
        track_id: SongId,
        dominant_mood: MoodLabel,
        context_type: ContextType,
        context_id: Option<i64>,
    ) -> StorageResult<SessionContext> {
        let now = Utc::now();
        let mut session = match self.active_session(user_id).await? {
            Some(session) => session,
            None => {
                tracing::debug!(user_id, "Opening new listening session");
                SessionContext::open(user_id, now)
            }
        };

        session.push_track(track_id);
        session.dominant_mood = dominant_mood;
        session.context_type = context_type;
        session.context_id = context_id;
        session.last_updated = now;

        self.deadline
            .run("save active session", self.sessions.save_active(&session))
            .await?;

        Ok(session)
    }

    /// Drop a skipped track from the window and recompute the dominant mood.
    ///
    /// Returns the updated session, or `None` when there was nothing to change.
    #[instrument(skip(self))]
    pub async fn handle_skip(
        &self,
        user_id: UserId,
        skipped_track_id: SongId,
    ) -> StorageResult<Option<SessionContext>> {
        let Some(mut session) = self.active_session(user_id).await? else {
            return Ok(None);
        };

        if !session.remove_track(skipped_track_id) {
            return Ok(None);
        }

        session.dominant_mood = self.dominant_mood(&session.recent_track_ids).await?;
        session.last_updated = Utc::now();

        self.deadline
            .run("save active session", self.sessions.save_active(&session))
            .await?;

        tracing::debug!(
            user_id,
            skipped_track_id,
            dominant_mood = %session.dominant_mood,
            window = session.recent_track_ids.len(),
            "Skip removed track from session"
        );

        Ok(Some(session))
    }

    /// Close the user's active session; the next played track opens a new one
    #[instrument(skip(self))]
    pub async fn end_session(&self, user_id: UserId) -> StorageResult<bool> {
        self.deadline
            .run("deactivate session", self.sessions.deactivate(user_id))
            .await
    }
}

/// Mode of `moods`, first-to-reach-max on ties
pub fn most_frequent(moods: &[MoodLabel]) -> MoodLabel {
    let mut counts: HashMap<MoodLabel, usize> = HashMap::new();
    let mut best = DEFAULT_MOOD;
    let mut best_count = 0;

    for mood in moods {
        let count = counts.entry(*mood).or_insert(0);
        *count += 1;
        if *count > best_count {
            best = *mood;
            best_count = *count;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use MoodLabel::*;

    #[test]
    fn test_most_frequent_empty_is_default() {
        assert_eq!(most_frequent(&[]), Happy);
    }

    #[test]
    fn test_most_frequent_majority() {
        assert_eq!(most_frequent(&[Sad, Chill, Chill, Intense]), Chill);
    }

    #[test]
    fn test_most_frequent_tie_goes_to_first_to_reach_max() {
        // Chill reaches 2 before Sad does
        assert_eq!(most_frequent(&[Sad, Chill, Chill, Sad]), Chill);
        // all singletons: the first one wins
        assert_eq!(most_frequent(&[Energetic, Sad, Chill]), Energetic);
    }
}
