//! Mood classifier
//!
//! Resolves a song id to a mood label. Stored classifications are a
//! permanent cache: once a song has a record it is returned as-is, even if
//! the genre table has changed since. Only [`GenreMoodClassifier::reclassify`]
//! refreshes a record, and nothing calls it automatically.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;

use crate::error::StorageResult;
use crate::models::{SongId, TrackMoodRecord};
use crate::mood::{genre_to_mood, MoodLabel, DEFAULT_MOOD};
use crate::store::{IoDeadline, SongCatalog, TrackMoodStore};

/// Produces a stable mood label for a song
#[async_trait]
pub trait MoodClassifier: Send + Sync {
    async fn classify(&self, song_id: SongId) -> StorageResult<MoodLabel>;
}

/// Classifier that infers moods from catalog genres and memoizes them
#[derive(Clone)]
pub struct GenreMoodClassifier {
    catalog: Arc<dyn SongCatalog>,
    store: Arc<dyn TrackMoodStore>,
    deadline: IoDeadline,
}

impl GenreMoodClassifier {
    pub fn new(catalog: Arc<dyn SongCatalog>, store: Arc<dyn TrackMoodStore>) -> Self {
        Self {
            catalog,
            store,
            deadline: IoDeadline::none(),
        }
    }

    /// Apply a deadline to every catalog and store call
    pub fn with_deadline(mut self, deadline: IoDeadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// Mood implied by the song's current catalog genre
    async fn infer(&self, song_id: SongId) -> StorageResult<MoodLabel> {
        let genre = self
            .deadline
            .run("load song genre", self.catalog.genre_for_song(song_id))
            .await?;

        Ok(match genre {
            Some(name) => genre_to_mood(&name),
            None => {
                tracing::debug!(song_id, "Song or genre missing, using default mood");
                DEFAULT_MOOD
            }
        })
    }

    /// Re-infer the mood from the current genre and overwrite the stored record
    #[instrument(skip(self))]
    pub async fn reclassify(&self, song_id: SongId) -> StorageResult<MoodLabel> {
        let mood = self.infer(song_id).await?;
        let now = Utc::now();

        let previous = self
            .deadline
            .run("load track mood", self.store.find(song_id))
            .await?;

        let mut record = TrackMoodRecord::inferred(song_id, mood, now);
        if let Some(previous) = &previous {
            record.created_at = previous.created_at;
        }

        self.deadline
            .run("replace track mood", self.store.replace(record))
            .await?;

        tracing::info!(
            song_id,
            mood = %mood,
            previous = ?previous.map(|p| p.primary_mood),
            "Track mood reclassified"
        );

        Ok(mood)
    }
}

#[async_trait]
impl MoodClassifier for GenreMoodClassifier {
    #[instrument(skip(self))]
    async fn classify(&self, song_id: SongId) -> StorageResult<MoodLabel> {
        if let Some(existing) = self
            .deadline
            .run("load track mood", self.store.find(song_id))
            .await?
        {
            return Ok(existing.primary_mood);
        }

        let mood = self.infer(song_id).await?;
        let stored = self
            .deadline
            .run(
                "save track mood",
                self.store
                    .insert_if_absent(TrackMoodRecord::inferred(song_id, mood, Utc::now())),
            )
            .await?;

        tracing::debug!(song_id, mood = %stored.primary_mood, "Track mood classified");

        // A concurrent classification may have won the insert
        Ok(stored.primary_mood)
    }
}
