//! Read-only access to the song catalog

use async_trait::async_trait;
use cadence_mood_engine::{SongCatalog, SongId, StorageResult};
use sqlx::PgPool;

use super::backend;
use crate::jobs::mood_backfill::UnclassifiedSongs;

/// Repository for catalog song lookups
#[derive(Clone)]
pub struct SongRepository {
    pool: PgPool,
}

impl SongRepository {
    /// Create a new SongRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SongCatalog for SongRepository {
    async fn genre_for_song(&self, song_id: SongId) -> StorageResult<Option<String>> {
        let row: Option<(Option<String>,)> = sqlx::query_as(
            r#"
            SELECT g.name
            FROM songs s
            LEFT JOIN genres g ON s.genre_id = g.id
            WHERE s.id = $1
            "#,
        )
        .bind(song_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend("load song genre"))?;

        Ok(row.and_then(|(genre,)| genre))
    }
}

#[async_trait]
impl UnclassifiedSongs for SongRepository {
    async fn next_unclassified(&self, limit: usize) -> StorageResult<Vec<SongId>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT s.id::BIGINT
            FROM songs s
            LEFT JOIN track_mood_features t ON t.song_id = s.id
            WHERE t.song_id IS NULL
            ORDER BY s.id
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(backend("list unclassified songs"))?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
