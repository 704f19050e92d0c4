//! Test fixtures for mood engine integration tests

use std::sync::Arc;

use cadence_mood_engine::memory::{InMemoryCatalog, InMemoryMoodStore};
use cadence_mood_engine::{
    CandidateSources, FixedPicker, GenreMoodClassifier, MoodLabel, RecommendationEngine, SongId,
    Track, TrackPicker,
};

use super::mocks::CountingClassifier;

/// Genre name that `genre_to_mood` maps to the given mood
pub fn genre_for(mood: MoodLabel) -> &'static str {
    match mood {
        MoodLabel::Chill => "Ambient",
        MoodLabel::Happy => "Pop",
        MoodLabel::Sad => "Delta Blues",
        MoodLabel::Energetic => "Techno",
        MoodLabel::Intense => "Metal",
        MoodLabel::Melancholic => "Folk",
    }
}

pub fn track(id: SongId) -> Track {
    Track {
        id,
        title: format!("Track {id}"),
        artist_name: format!("Artist {}", id % 7),
        duration: 180 + id as i32,
        cover_url: Some(format!("/covers/{id}.jpg")),
    }
}

/// Catalog whose songs carry genres for the given moods, in order
pub fn catalog_of(songs: &[(SongId, MoodLabel)]) -> InMemoryCatalog {
    songs.iter().fold(InMemoryCatalog::new(), |catalog, (id, mood)| {
        catalog.with_song(track(*id), Some(genre_for(*mood)))
    })
}

/// Engine over in-memory stores with a counting classifier in front
pub struct Harness {
    pub catalog: Arc<InMemoryCatalog>,
    pub store: Arc<InMemoryMoodStore>,
    pub classifier: Arc<CountingClassifier>,
    pub engine: RecommendationEngine,
}

impl Harness {
    pub fn new(catalog: InMemoryCatalog) -> Self {
        Self::with_picker(catalog, Arc::new(FixedPicker(0)))
    }

    pub fn with_picker(catalog: InMemoryCatalog, picker: Arc<dyn TrackPicker>) -> Self {
        let catalog = Arc::new(catalog);
        let store = Arc::new(InMemoryMoodStore::new());
        let classifier = Arc::new(CountingClassifier::new(Arc::new(
            GenreMoodClassifier::new(catalog.clone(), store.clone()),
        )));

        let engine = RecommendationEngine::new(
            classifier.clone(),
            store.clone(),
            store.clone(),
            CandidateSources::uniform(catalog.clone()),
        )
        .with_picker(picker);

        Self {
            catalog,
            store,
            classifier,
            engine,
        }
    }

    /// Ids in the user's active session window
    pub fn window(&self, user_id: i64) -> Vec<SongId> {
        self.store
            .session_for(user_id)
            .map(|s| s.recent_track_ids)
            .unwrap_or_default()
    }
}
