//! Collaborator contracts
//!
//! The engine never talks to a database directly. It reads the song catalog
//! and candidate pools through these traits and keeps its own state (mood
//! records, preferences, sessions) behind the three store traits. The worker
//! provides Postgres implementations; [`crate::memory`] provides in-process
//! ones.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::models::{
    ContextType, MoodCount, SessionContext, SongId, Track, TrackMoodRecord, UserId,
    UserMoodPreference,
};
use crate::mood::Smoothness;

/// Read access to the song catalog
#[async_trait]
pub trait SongCatalog: Send + Sync {
    /// Genre name of a song; `None` when the song or its genre is missing
    async fn genre_for_song(&self, song_id: SongId) -> StorageResult<Option<String>>;
}

/// Parameters of a candidate fetch
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery<'a> {
    pub context_type: ContextType,
    pub context_id: Option<i64>,
    pub exclude_ids: &'a [SongId],
    pub limit: usize,
}

/// A pool of tracks eligible to be played next
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn candidates(&self, query: &CandidateQuery<'_>) -> StorageResult<Vec<Track>>;
}

/// Persisted mood classifications
#[async_trait]
pub trait TrackMoodStore: Send + Sync {
    async fn find(&self, song_id: SongId) -> StorageResult<Option<TrackMoodRecord>>;

    /// Insert unless a record for the song exists; returns the stored record
    async fn insert_if_absent(&self, record: TrackMoodRecord) -> StorageResult<TrackMoodRecord>;

    /// Overwrite the classification of a song (explicit re-classification)
    async fn replace(&self, record: TrackMoodRecord) -> StorageResult<TrackMoodRecord>;

    /// Classified songs per mood, most frequent first
    async fn distribution(&self) -> StorageResult<Vec<MoodCount>>;
}

/// Per-user mood mode settings
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn find(&self, user_id: UserId) -> StorageResult<Option<UserMoodPreference>>;

    /// Create or update the user's settings; returns the stored row
    async fn upsert(
        &self,
        user_id: UserId,
        enabled: bool,
        smoothness: Smoothness,
    ) -> StorageResult<UserMoodPreference>;
}

/// Listening sessions; at most one active session per user
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_active(&self, user_id: UserId) -> StorageResult<Option<SessionContext>>;

    /// Insert or update the user's single active session
    async fn save_active(&self, session: &SessionContext) -> StorageResult<()>;

    /// Mark the active session inactive; returns whether one existed
    async fn deactivate(&self, user_id: UserId) -> StorageResult<bool>;
}

/// Candidate strategy per playback context.
///
/// Every [`ContextType`] has exactly one source; resolution is an exhaustive
/// match so adding a context type forces a strategy for it.
#[derive(Clone)]
pub struct CandidateSources {
    pub playlist: Arc<dyn CandidateSource>,
    pub liked: Arc<dyn CandidateSource>,
    pub explore: Arc<dyn CandidateSource>,
    pub fallback: Arc<dyn CandidateSource>,
}

impl CandidateSources {
    /// Use one source for every context
    pub fn uniform(source: Arc<dyn CandidateSource>) -> Self {
        Self {
            playlist: source.clone(),
            liked: source.clone(),
            explore: source.clone(),
            fallback: source,
        }
    }

    /// Context actually served; a playlist without an id is not a playlist
    pub fn resolve(context_type: ContextType, context_id: Option<i64>) -> ContextType {
        match (context_type, context_id) {
            (ContextType::Playlist, None) => ContextType::Fallback,
            (other, _) => other,
        }
    }

    pub fn source_for(&self, context_type: ContextType) -> &Arc<dyn CandidateSource> {
        match context_type {
            ContextType::Playlist => &self.playlist,
            ContextType::Liked => &self.liked,
            ContextType::Explore => &self.explore,
            ContextType::Fallback => &self.fallback,
        }
    }

    /// Fetch candidates for a request, applying the context's limit
    pub async fn fetch(
        &self,
        context_type: ContextType,
        context_id: Option<i64>,
        exclude_ids: &[SongId],
    ) -> StorageResult<Vec<Track>> {
        let resolved = Self::resolve(context_type, context_id);
        let query = CandidateQuery {
            context_type: resolved,
            context_id,
            exclude_ids,
            limit: resolved.candidate_limit(),
        };
        self.source_for(resolved).candidates(&query).await
    }
}

/// Optional deadline applied to collaborator calls
#[derive(Debug, Clone, Copy, Default)]
pub struct IoDeadline(Option<Duration>);

impl IoDeadline {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self(timeout)
    }

    pub fn none() -> Self {
        Self(None)
    }

    /// Run `fut`, failing with [`StorageError::Timeout`] if it overruns
    pub async fn run<T, F>(&self, operation: &'static str, fut: F) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>>,
    {
        match self.0 {
            None => fut.await,
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        operation,
                        timeout_ms = limit.as_millis() as u64,
                        "Storage call timed out"
                    );
                    Err(StorageError::Timeout {
                        operation,
                        millis: limit.as_millis() as u64,
                    })
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_without_id_resolves_to_fallback() {
        assert_eq!(
            CandidateSources::resolve(ContextType::Playlist, None),
            ContextType::Fallback
        );
        assert_eq!(
            CandidateSources::resolve(ContextType::Playlist, Some(4)),
            ContextType::Playlist
        );
        assert_eq!(
            CandidateSources::resolve(ContextType::Liked, None),
            ContextType::Liked
        );
    }

    #[tokio::test]
    async fn test_deadline_passes_through_without_limit() {
        let deadline = IoDeadline::none();
        let value = deadline.run("noop", async { Ok::<_, StorageError>(7) }).await;
        assert_eq!(value.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_deadline_times_out() {
        let deadline = IoDeadline::new(Some(Duration::from_millis(10)));
        let result: StorageResult<()> = deadline
            .run("slow call", async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            })
            .await;
        assert!(matches!(
            result,
            Err(StorageError::Timeout {
                operation: "slow call",
                millis: 10
            })
        ));
    }
}
