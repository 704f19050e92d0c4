//! In-process implementations of the collaborator traits
//!
//! Used by tests and local simulations. Candidate order is deterministic:
//! playlists keep their track order and every other context returns catalog
//! insertion order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::error::StorageResult;
use crate::models::{
    ContextType, MoodCount, SessionContext, SongId, Track, TrackMoodRecord, UserId,
    UserMoodPreference,
};
use crate::mood::{MoodLabel, Smoothness};
use crate::store::{
    CandidateQuery, CandidateSource, PreferenceStore, SessionStore, SongCatalog, TrackMoodStore,
};

/// Mood records, preferences and sessions held in concurrent maps
#[derive(Debug, Default)]
pub struct InMemoryMoodStore {
    moods: DashMap<SongId, TrackMoodRecord>,
    preferences: DashMap<UserId, UserMoodPreference>,
    sessions: DashMap<UserId, SessionContext>,
    ended: DashMap<UserId, Vec<SessionContext>>,
}

impl InMemoryMoodStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mood_record(&self, song_id: SongId) -> Option<TrackMoodRecord> {
        self.moods.get(&song_id).map(|r| r.value().clone())
    }

    pub fn preference_for(&self, user_id: UserId) -> Option<UserMoodPreference> {
        self.preferences.get(&user_id).map(|p| p.value().clone())
    }

    pub fn session_for(&self, user_id: UserId) -> Option<SessionContext> {
        self.sessions.get(&user_id).map(|s| s.value().clone())
    }

    /// Sessions closed for the user, oldest first
    pub fn ended_sessions(&self, user_id: UserId) -> Vec<SessionContext> {
        self.ended
            .get(&user_id)
            .map(|s| s.value().clone())
            .unwrap_or_default()
    }

    /// Seed an active session directly
    pub fn put_session(&self, session: SessionContext) {
        self.sessions.insert(session.user_id, session);
    }

    /// Seed a stored classification directly
    pub fn put_mood(&self, song_id: SongId, mood: MoodLabel) {
        self.moods
            .insert(song_id, TrackMoodRecord::inferred(song_id, mood, Utc::now()));
    }
}

#[async_trait]
impl TrackMoodStore for InMemoryMoodStore {
    async fn find(&self, song_id: SongId) -> StorageResult<Option<TrackMoodRecord>> {
        Ok(self.mood_record(song_id))
    }

    async fn insert_if_absent(&self, record: TrackMoodRecord) -> StorageResult<TrackMoodRecord> {
        Ok(self
            .moods
            .entry(record.song_id)
            .or_insert(record)
            .value()
            .clone())
    }

    async fn replace(&self, record: TrackMoodRecord) -> StorageResult<TrackMoodRecord> {
        self.moods.insert(record.song_id, record.clone());
        Ok(record)
    }

    async fn distribution(&self) -> StorageResult<Vec<MoodCount>> {
        let mut counts: HashMap<MoodLabel, i64> = HashMap::new();
        for record in self.moods.iter() {
            *counts.entry(record.primary_mood).or_insert(0) += 1;
        }

        let mut distribution: Vec<MoodCount> = MoodLabel::ALL
            .iter()
            .filter_map(|mood| {
                counts.get(mood).map(|count| MoodCount {
                    mood: *mood,
                    count: *count,
                })
            })
            .collect();
        distribution.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(distribution)
    }
}

#[async_trait]
impl PreferenceStore for InMemoryMoodStore {
    async fn find(&self, user_id: UserId) -> StorageResult<Option<UserMoodPreference>> {
        Ok(self.preference_for(user_id))
    }

    async fn upsert(
        &self,
        user_id: UserId,
        enabled: bool,
        smoothness: Smoothness,
    ) -> StorageResult<UserMoodPreference> {
        let preference = UserMoodPreference {
            user_id,
            enabled,
            transition_smoothness: smoothness,
            last_toggle_at: Utc::now(),
        };
        self.preferences.insert(user_id, preference.clone());
        Ok(preference)
    }
}

#[async_trait]
impl SessionStore for InMemoryMoodStore {
    async fn find_active(&self, user_id: UserId) -> StorageResult<Option<SessionContext>> {
        Ok(self.session_for(user_id))
    }

    async fn save_active(&self, session: &SessionContext) -> StorageResult<()> {
        self.sessions.insert(session.user_id, session.clone());
        Ok(())
    }

    async fn deactivate(&self, user_id: UserId) -> StorageResult<bool> {
        match self.sessions.remove(&user_id) {
            Some((_, mut session)) => {
                session.active = false;
                session.last_updated = Utc::now();
                self.ended.entry(user_id).or_default().push(session);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Clone)]
struct CatalogSong {
    track: Track,
    genre: Option<String>,
}

/// Fixed song catalog that also serves as a candidate source
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    songs: Vec<CatalogSong>,
    playlists: HashMap<i64, Vec<SongId>>,
    genre_lookups: AtomicUsize,
    candidate_calls: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_song(mut self, track: Track, genre: Option<&str>) -> Self {
        self.songs.push(CatalogSong {
            track,
            genre: genre.map(str::to_string),
        });
        self
    }

    pub fn with_playlist(mut self, playlist_id: i64, song_ids: Vec<SongId>) -> Self {
        self.playlists.insert(playlist_id, song_ids);
        self
    }

    pub fn genre_lookups(&self) -> usize {
        self.genre_lookups.load(Ordering::SeqCst)
    }

    pub fn candidate_calls(&self) -> usize {
        self.candidate_calls.load(Ordering::SeqCst)
    }

    pub fn song_ids(&self) -> Vec<SongId> {
        self.songs.iter().map(|s| s.track.id).collect()
    }

    fn track(&self, song_id: SongId) -> Option<&Track> {
        self.songs
            .iter()
            .find(|s| s.track.id == song_id)
            .map(|s| &s.track)
    }
}

#[async_trait]
impl SongCatalog for InMemoryCatalog {
    async fn genre_for_song(&self, song_id: SongId) -> StorageResult<Option<String>> {
        self.genre_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .songs
            .iter()
            .find(|s| s.track.id == song_id)
            .and_then(|s| s.genre.clone()))
    }
}

#[async_trait]
impl CandidateSource for InMemoryCatalog {
    async fn candidates(&self, query: &CandidateQuery<'_>) -> StorageResult<Vec<Track>> {
        self.candidate_calls.fetch_add(1, Ordering::SeqCst);

        let pool: Vec<&Track> = match (query.context_type, query.context_id) {
            (ContextType::Playlist, Some(playlist_id)) => self
                .playlists
                .get(&playlist_id)
                .map(|ids| ids.iter().filter_map(|id| self.track(*id)).collect())
                .unwrap_or_default(),
            _ => self.songs.iter().map(|s| &s.track).collect(),
        };

        Ok(pool
            .into_iter()
            .filter(|t| !query.exclude_ids.contains(&t.id))
            .take(query.limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: SongId) -> Track {
        Track {
            id,
            title: format!("Song {id}"),
            artist_name: "Artist".to_string(),
            duration: 200,
            cover_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_if_absent_keeps_first_record() {
        let store = InMemoryMoodStore::new();
        let now = Utc::now();
        let first = store
            .insert_if_absent(TrackMoodRecord::inferred(1, MoodLabel::Sad, now))
            .await
            .unwrap();
        let second = store
            .insert_if_absent(TrackMoodRecord::inferred(1, MoodLabel::Happy, now))
            .await
            .unwrap();
        assert_eq!(first.primary_mood, MoodLabel::Sad);
        assert_eq!(second.primary_mood, MoodLabel::Sad);
    }

    #[tokio::test]
    async fn test_distribution_most_frequent_first() {
        let store = InMemoryMoodStore::new();
        store.put_mood(1, MoodLabel::Chill);
        store.put_mood(2, MoodLabel::Intense);
        store.put_mood(3, MoodLabel::Intense);

        let distribution = store.distribution().await.unwrap();
        assert_eq!(
            distribution,
            vec![
                MoodCount { mood: MoodLabel::Intense, count: 2 },
                MoodCount { mood: MoodLabel::Chill, count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_deactivate_moves_session_to_history() {
        let store = InMemoryMoodStore::new();
        store.put_session(SessionContext::open(4, Utc::now()));

        assert!(store.deactivate(4).await.unwrap());
        assert!(!store.deactivate(4).await.unwrap());
        assert!(store.session_for(4).is_none());

        let ended = store.ended_sessions(4);
        assert_eq!(ended.len(), 1);
        assert!(!ended[0].active);
    }

    #[tokio::test]
    async fn test_candidates_respect_playlist_order_exclusions_and_limit() {
        let mut catalog = InMemoryCatalog::new();
        for id in 1..=60 {
            catalog = catalog.with_song(track(id), Some("Pop"));
        }
        let catalog = catalog.with_playlist(9, vec![5, 3, 8, 1]);

        let playlist = catalog
            .candidates(&CandidateQuery {
                context_type: ContextType::Playlist,
                context_id: Some(9),
                exclude_ids: &[3],
                limit: 50,
            })
            .await
            .unwrap();
        assert_eq!(
            playlist.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![5, 8, 1]
        );

        let fallback = catalog
            .candidates(&CandidateQuery {
                context_type: ContextType::Fallback,
                context_id: None,
                exclude_ids: &[],
                limit: 50,
            })
            .await
            .unwrap();
        assert_eq!(fallback.len(), 50);
        assert_eq!(catalog.candidate_calls(), 2);
    }
}
