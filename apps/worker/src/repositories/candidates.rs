//! Candidate pools for next-track requests
//!
//! Playlists are served in playlist order; every other context draws a
//! random sample of the catalog. Missing artist names read as "Unknown".

use async_trait::async_trait;
use cadence_mood_engine::{CandidateQuery, CandidateSource, StorageResult, Track};
use sqlx::{FromRow, PgPool};

use super::backend;

/// Candidate row as selected from `songs`
#[derive(Debug, FromRow)]
struct CandidateRow {
    id: i64,
    title: String,
    artist_name: Option<String>,
    duration: Option<i32>,
    cover_url: Option<String>,
}

impl From<CandidateRow> for Track {
    fn from(row: CandidateRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            artist_name: row.artist_name.unwrap_or_else(|| "Unknown".to_string()),
            duration: row.duration.unwrap_or(0),
            cover_url: row.cover_url,
        }
    }
}

/// Songs of one playlist, in playlist position order
#[derive(Clone)]
pub struct PlaylistCandidates {
    pool: PgPool,
}

impl PlaylistCandidates {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateSource for PlaylistCandidates {
    async fn candidates(&self, query: &CandidateQuery<'_>) -> StorageResult<Vec<Track>> {
        // Playlist requests without an id are routed to the fallback source
        let Some(playlist_id) = query.context_id else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT s.id::BIGINT AS id, s.title, s.artist_name,
                   s.duration::INT AS duration, s.cover_url
            FROM songs s
            INNER JOIN playlist_songs ps ON ps.song_id = s.id
            WHERE ps.playlist_id = $1
              AND NOT (s.id = ANY($2))
            ORDER BY ps.position
            LIMIT $3
            "#,
        )
        .bind(playlist_id)
        .bind(query.exclude_ids)
        .bind(query.limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(backend("fetch playlist candidates"))?;

        Ok(rows.into_iter().map(Track::from).collect())
    }
}

/// Uniform random sample of the whole catalog
#[derive(Clone)]
pub struct RandomCandidates {
    pool: PgPool,
}

impl RandomCandidates {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateSource for RandomCandidates {
    async fn candidates(&self, query: &CandidateQuery<'_>) -> StorageResult<Vec<Track>> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT s.id::BIGINT AS id, s.title, s.artist_name,
                   s.duration::INT AS duration, s.cover_url
            FROM songs s
            WHERE s.id > 0
              AND NOT (s.id = ANY($1))
            ORDER BY RANDOM()
            LIMIT $2
            "#,
        )
        .bind(query.exclude_ids)
        .bind(query.limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(backend("fetch catalog candidates"))?;

        tracing::trace!(
            context = %query.context_type,
            returned = rows.len(),
            excluded = query.exclude_ids.len(),
            "Fetched random candidates"
        );

        Ok(rows.into_iter().map(Track::from).collect())
    }
}
