//! Cadence worker
//!
//! Hosts the mood recommendation engine on top of Postgres and consumes mood
//! jobs from a Redis list. The binary in `main.rs` only wires configuration,
//! the pool and the queue loop; everything it runs lives here so it can be
//! tested without a process.

pub mod config;
pub mod error;
pub mod jobs;
pub mod queue;
pub mod repositories;

use std::sync::Arc;

use cadence_mood_engine::{CandidateSources, GenreMoodClassifier, IoDeadline, RecommendationEngine};
use sqlx::PgPool;

pub use config::Config;
pub use error::{WorkerError, WorkerResult};

use repositories::{
    PlaylistCandidates, PreferenceRepository, RandomCandidates, SessionRepository,
    SongRepository, TrackMoodRepository,
};

/// Apply pending schema migrations
pub async fn run_migrations(pool: &PgPool) -> WorkerResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Shared state handed to every job
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub engine: RecommendationEngine,
    pub classifier: Arc<GenreMoodClassifier>,
    pub mood_store: TrackMoodRepository,
    pub songs: SongRepository,
}

impl AppState {
    /// Build the engine and its Postgres collaborators over one pool
    pub fn new(db: PgPool, config: Config) -> Self {
        let deadline = IoDeadline::new(config.mood().io_timeout());

        let songs = SongRepository::new(db.clone());
        let mood_store = TrackMoodRepository::new(db.clone());
        let classifier = Arc::new(
            GenreMoodClassifier::new(Arc::new(songs.clone()), Arc::new(mood_store.clone()))
                .with_deadline(deadline),
        );

        let random = Arc::new(RandomCandidates::new(db.clone()));
        let sources = CandidateSources {
            playlist: Arc::new(PlaylistCandidates::new(db.clone())),
            liked: random.clone(),
            explore: random.clone(),
            fallback: random,
        };

        let engine = RecommendationEngine::new(
            classifier.clone(),
            Arc::new(PreferenceRepository::new(db.clone())),
            Arc::new(SessionRepository::new(db.clone())),
            sources,
        )
        .with_deadline(deadline)
        .with_session_locks(config.mood().serialize_sessions);

        Self {
            db,
            config,
            engine,
            classifier,
            mood_store,
            songs,
        }
    }
}
