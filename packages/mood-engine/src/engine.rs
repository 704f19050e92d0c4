//! Recommendation engine
//!
//! Entry point for every mood-mode operation. The engine reads preferences,
//! asks the session tracker for the dominant mood, fetches candidates for the
//! playback context, ranks them by mood distance and records the pick.

use std::sync::Arc;

use tokio::sync::OwnedMutexGuard;
use tracing::instrument;

use crate::classifier::MoodClassifier;
use crate::error::StorageResult;
use crate::locks::UserLocks;
use crate::models::{
    ContextType, CurrentMood, MoodStatus, RecommendedTrack, SongId, ToggleOutcome, UserId,
    UserMoodPreference,
};
use crate::mood::Smoothness;
use crate::picker::{RandomPicker, TrackPicker};
use crate::ranking::{rank, shortlist, ClassifiedTrack};
use crate::session::SessionTracker;
use crate::store::{CandidateSources, IoDeadline, PreferenceStore, SessionStore};

#[derive(Clone)]
pub struct RecommendationEngine {
    classifier: Arc<dyn MoodClassifier>,
    preferences: Arc<dyn PreferenceStore>,
    tracker: SessionTracker,
    sources: CandidateSources,
    picker: Arc<dyn TrackPicker>,
    locks: Option<Arc<UserLocks>>,
    deadline: IoDeadline,
}

impl RecommendationEngine {
    /// Engine with a random picker, per-user serialisation and no I/O deadline
    pub fn new(
        classifier: Arc<dyn MoodClassifier>,
        preferences: Arc<dyn PreferenceStore>,
        sessions: Arc<dyn SessionStore>,
        sources: CandidateSources,
    ) -> Self {
        let tracker = SessionTracker::new(classifier.clone(), sessions);
        Self {
            classifier,
            preferences,
            tracker,
            sources,
            picker: Arc::new(RandomPicker),
            locks: Some(Arc::new(UserLocks::new())),
            deadline: IoDeadline::none(),
        }
    }

    pub fn with_picker(mut self, picker: Arc<dyn TrackPicker>) -> Self {
        self.picker = picker;
        self
    }

    /// Apply a deadline to preference, session and candidate calls
    pub fn with_deadline(mut self, deadline: IoDeadline) -> Self {
        self.deadline = deadline;
        self.tracker = self.tracker.with_deadline(deadline);
        self
    }

    /// Toggle per-user serialisation of session updates
    pub fn with_session_locks(mut self, enabled: bool) -> Self {
        self.locks = enabled.then(|| Arc::new(UserLocks::new()));
        self
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    async fn lock(&self, user_id: UserId) -> Option<OwnedMutexGuard<()>> {
        match &self.locks {
            Some(locks) => Some(locks.acquire(user_id).await),
            None => None,
        }
    }

    /// Picker choice clamped to `0..len`; `len` must be non-zero
    fn pick_index(&self, len: usize) -> usize {
        // Custom pickers are not trusted to stay in range
        self.picker.pick(len).min(len - 1)
    }

    async fn preference(&self, user_id: UserId) -> StorageResult<Option<UserMoodPreference>> {
        self.deadline
            .run("load mood preference", self.preferences.find(user_id))
            .await
    }

    /// Enable or disable mood mode for a user
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        user_id: UserId,
        enabled: bool,
        smoothness: Option<Smoothness>,
    ) -> StorageResult<ToggleOutcome> {
        let smoothness = smoothness.unwrap_or_default();
        let preference = self
            .deadline
            .run(
                "save mood preference",
                self.preferences.upsert(user_id, enabled, smoothness),
            )
            .await?;

        let mut current_mood = None;
        if enabled {
            if let Some(session) = self.tracker.active_session(user_id).await? {
                if !session.recent_track_ids.is_empty() {
                    current_mood = Some(
                        self.tracker
                            .dominant_mood(&session.recent_track_ids)
                            .await?,
                    );
                }
            }
        }

        tracing::info!(
            user_id,
            enabled,
            smoothness = %preference.transition_smoothness,
            "Mood mode toggled"
        );

        Ok(ToggleOutcome {
            enabled: preference.enabled,
            current_mood,
            smoothness: preference.transition_smoothness,
        })
    }

    /// Current mood mode settings plus the session's mood when enabled
    #[instrument(skip(self))]
    pub async fn status(&self, user_id: UserId) -> StorageResult<MoodStatus> {
        let Some(preference) = self.preference(user_id).await? else {
            return Ok(MoodStatus::disabled());
        };

        let mut status = MoodStatus {
            enabled: preference.enabled,
            current_mood: None,
            smoothness: preference.transition_smoothness,
            recent_moods: Vec::new(),
        };

        if preference.enabled {
            if let Some(session) = self.tracker.active_session(user_id).await? {
                if !session.recent_track_ids.is_empty() {
                    let window = &session.recent_track_ids;
                    status.current_mood = Some(self.tracker.dominant_mood(window).await?);
                    status.recent_moods = self.tracker.recent_moods(window).await?;
                }
            }
        }

        Ok(status)
    }

    /// Dominant mood of the user's active session, recomputed from its window
    pub async fn current_mood(&self, user_id: UserId) -> StorageResult<CurrentMood> {
        let Some(session) = self.tracker.active_session(user_id).await? else {
            return Ok(CurrentMood::default());
        };

        let mood = self.tracker.dominant_mood(&session.recent_track_ids).await?;
        Ok(CurrentMood {
            mood: Some(mood),
            recent_tracks: session.recent_track_ids,
            context_type: Some(session.context_type),
        })
    }

    /// Choose the next track for a user, or `None` when no candidate exists
    #[instrument(skip(self))]
    pub async fn next_track(
        &self,
        user_id: UserId,
        context_type: ContextType,
        context_id: Option<i64>,
    ) -> StorageResult<Option<RecommendedTrack>> {
        let preference = match self.preference(user_id).await? {
            Some(preference) if preference.enabled => preference,
            _ => return self.mood_agnostic_pick(context_type, context_id).await,
        };

        let _guard = self.lock(user_id).await;

        let window = self
            .tracker
            .active_session(user_id)
            .await?
            .map(|session| session.recent_track_ids)
            .unwrap_or_default();
        let dominant = self.tracker.dominant_mood(&window).await?;

        let candidates = self
            .deadline
            .run(
                "fetch candidates",
                self.sources.fetch(context_type, context_id, &window),
            )
            .await?;
        if candidates.is_empty() {
            tracing::debug!(user_id, context = %context_type, "No candidates available");
            return Ok(None);
        }

        let mut classified = Vec::with_capacity(candidates.len());
        for track in candidates {
            let mood = self.classifier.classify(track.id).await?;
            classified.push(ClassifiedTrack { track, mood });
        }

        let ranked = rank(classified, dominant, preference.transition_smoothness);
        let options = shortlist(&ranked);
        let chosen = options[self.pick_index(options.len())].clone();

        // The session keeps the mood the pick was ranked against
        self.tracker
            .record_played(user_id, chosen.track.id, dominant, context_type, context_id)
            .await?;

        tracing::info!(
            user_id,
            track_id = chosen.track.id,
            dominant = %dominant,
            mood = %chosen.mood,
            distance = chosen.distance,
            ranked = ranked.len(),
            "Mood-aware track selected"
        );

        Ok(Some(RecommendedTrack {
            track: chosen.track,
            mood: Some(chosen.mood),
            mood_distance: Some(chosen.distance),
        }))
    }

    /// Uniform pick from the context's candidates; touches no mood state
    async fn mood_agnostic_pick(
        &self,
        context_type: ContextType,
        context_id: Option<i64>,
    ) -> StorageResult<Option<RecommendedTrack>> {
        let mut candidates = self
            .deadline
            .run(
                "fetch candidates",
                self.sources.fetch(context_type, context_id, &[]),
            )
            .await?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let index = self.pick_index(candidates.len());
        Ok(Some(RecommendedTrack {
            track: candidates.swap_remove(index),
            mood: None,
            mood_distance: None,
        }))
    }

    /// Acknowledge a skip; returns whether the session window changed
    #[instrument(skip(self))]
    pub async fn skip(&self, user_id: UserId, track_id: SongId) -> StorageResult<bool> {
        let _guard = self.lock(user_id).await;
        Ok(self.tracker.handle_skip(user_id, track_id).await?.is_some())
    }

    /// Close the user's active session
    #[instrument(skip(self))]
    pub async fn end_session(&self, user_id: UserId) -> StorageResult<bool> {
        let _guard = self.lock(user_id).await;
        let closed = self.tracker.end_session(user_id).await?;
        if closed {
            tracing::info!(user_id, "Listening session ended");
        }
        Ok(closed)
    }
}
