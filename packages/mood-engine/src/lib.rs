//! Mood-aware next-track recommendation for Cadence
//!
//! When a listener turns on mood mode, the next track is chosen to stay close
//! to the mood of what they have just been playing. The crate is organised
//! bottom-up:
//!
//! - [`mood`]: the closed mood vocabulary, genre keyword table and distance matrix
//! - [`classifier`]: song id to mood, memoized in a [`TrackMoodStore`]
//! - [`session`]: the rolling per-user window and its dominant mood
//! - [`ranking`]: filtering and ordering candidates by mood distance
//! - [`engine`]: the operations callers use (`toggle`, `status`, `next_track`, ...)
//!
//! All persistence and catalog access goes through the traits in [`store`].
//! The worker crate supplies Postgres implementations; [`memory`] has
//! in-process ones.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cadence_mood_engine::memory::{InMemoryCatalog, InMemoryMoodStore};
//! use cadence_mood_engine::{
//!     CandidateSources, ContextType, GenreMoodClassifier, RecommendationEngine, Smoothness,
//! };
//!
//! # async fn example() -> Result<(), cadence_mood_engine::StorageError> {
//! let catalog = Arc::new(InMemoryCatalog::new());
//! let store = Arc::new(InMemoryMoodStore::new());
//! let classifier = Arc::new(GenreMoodClassifier::new(catalog.clone(), store.clone()));
//!
//! let engine = RecommendationEngine::new(
//!     classifier,
//!     store.clone(),
//!     store,
//!     CandidateSources::uniform(catalog),
//! );
//!
//! engine.toggle(7, true, Some(Smoothness::Strict)).await?;
//! if let Some(next) = engine.next_track(7, ContextType::Explore, None).await? {
//!     println!("{} ({:?})", next.track.title, next.mood);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod engine;
pub mod error;
pub mod locks;
pub mod memory;
pub mod models;
pub mod mood;
pub mod picker;
pub mod ranking;
pub mod session;
pub mod store;

pub use classifier::{GenreMoodClassifier, MoodClassifier};
pub use engine::RecommendationEngine;
pub use error::{StorageError, StorageResult};
pub use locks::UserLocks;
pub use models::{
    ContextType, CurrentMood, MoodCount, MoodStatus, RecommendedTrack, SessionContext, SongId,
    ToggleOutcome, Track, TrackMoodRecord, UserId, UserMoodPreference,
};
pub use mood::{genre_to_mood, mood_distance, moods_compatible, MoodLabel, Smoothness};
pub use picker::{FixedPicker, RandomPicker, SeededPicker, TrackPicker};
pub use session::SessionTracker;
pub use store::{
    CandidateQuery, CandidateSource, CandidateSources, IoDeadline, PreferenceStore, SessionStore,
    SongCatalog, TrackMoodStore,
};
