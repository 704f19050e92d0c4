//! Postgres implementations of the mood engine's collaborator traits
//!
//! Every repository holds a clone of the shared pool. The catalog tables
//! (`songs`, `genres`, `playlist_songs`) belong to the content service and
//! are only read here; the three mood tables are created by this crate's
//! migrations.

pub mod candidates;
pub mod preferences;
pub mod sessions;
pub mod songs;
pub mod track_mood;

pub use candidates::{PlaylistCandidates, RandomCandidates};
pub use preferences::PreferenceRepository;
pub use sessions::SessionRepository;
pub use songs::SongRepository;
pub use track_mood::TrackMoodRepository;

use cadence_mood_engine::StorageError;

/// Map a sqlx failure to the engine's storage error for `operation`
pub(crate) fn backend(operation: &'static str) -> impl FnOnce(sqlx::Error) -> StorageError {
    move |err| StorageError::backend(operation, err)
}
