//! Persisted track mood classifications (`track_mood_features`)

use async_trait::async_trait;
use cadence_mood_engine::{
    MoodCount, MoodLabel, SongId, StorageError, StorageResult, TrackMoodRecord, TrackMoodStore,
};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use super::backend;

const RECORD_COLUMNS: &str = "song_id, primary_mood, mood_confidence, mood_tags, \
     energy, valence, tempo, danceability, created_at, updated_at";

/// Row returned from `track_mood_features`
#[derive(Debug, FromRow)]
struct TrackMoodRow {
    song_id: i64,
    primary_mood: String,
    mood_confidence: f64,
    mood_tags: Json<Vec<String>>,
    energy: Option<f64>,
    valence: Option<f64>,
    tempo: Option<f64>,
    danceability: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TrackMoodRow> for TrackMoodRecord {
    type Error = StorageError;

    fn try_from(row: TrackMoodRow) -> Result<Self, Self::Error> {
        let primary_mood: MoodLabel = row.primary_mood.parse().map_err(|e| {
            StorageError::corrupt("track mood", format!("song {}: {e}", row.song_id))
        })?;

        Ok(Self {
            song_id: row.song_id,
            primary_mood,
            confidence: row.mood_confidence,
            mood_tags: row.mood_tags.0,
            energy: row.energy,
            valence: row.valence,
            tempo: row.tempo,
            danceability: row.danceability,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for track mood classifications
#[derive(Clone)]
pub struct TrackMoodRepository {
    pool: PgPool,
}

impl TrackMoodRepository {
    /// Create a new TrackMoodRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(
        &self,
        song_id: SongId,
        operation: &'static str,
    ) -> StorageResult<Option<TrackMoodRecord>> {
        let row = sqlx::query_as::<_, TrackMoodRow>(&format!(
            "SELECT {RECORD_COLUMNS} FROM track_mood_features WHERE song_id = $1"
        ))
        .bind(song_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend(operation))?;

        row.map(TrackMoodRecord::try_from).transpose()
    }
}

#[async_trait]
impl TrackMoodStore for TrackMoodRepository {
    async fn find(&self, song_id: SongId) -> StorageResult<Option<TrackMoodRecord>> {
        self.fetch(song_id, "load track mood").await
    }

    async fn insert_if_absent(&self, record: TrackMoodRecord) -> StorageResult<TrackMoodRecord> {
        sqlx::query(
            r#"
            INSERT INTO track_mood_features (
                song_id, primary_mood, mood_confidence, mood_tags,
                energy, valence, tempo, danceability, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (song_id) DO NOTHING
            "#,
        )
        .bind(record.song_id)
        .bind(record.primary_mood.as_str())
        .bind(record.confidence)
        .bind(Json(&record.mood_tags))
        .bind(record.energy)
        .bind(record.valence)
        .bind(record.tempo)
        .bind(record.danceability)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend("save track mood"))?;

        // Whichever insert won is the classification from now on
        self.fetch(record.song_id, "save track mood")
            .await?
            .ok_or_else(|| {
                StorageError::corrupt(
                    "track mood",
                    format!("song {} missing after insert", record.song_id),
                )
            })
    }

    async fn replace(&self, record: TrackMoodRecord) -> StorageResult<TrackMoodRecord> {
        let row = sqlx::query_as::<_, TrackMoodRow>(&format!(
            r#"
            INSERT INTO track_mood_features (
                song_id, primary_mood, mood_confidence, mood_tags,
                energy, valence, tempo, danceability, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (song_id) DO UPDATE SET
                primary_mood = EXCLUDED.primary_mood,
                mood_confidence = EXCLUDED.mood_confidence,
                mood_tags = EXCLUDED.mood_tags,
                energy = EXCLUDED.energy,
                valence = EXCLUDED.valence,
                tempo = EXCLUDED.tempo,
                danceability = EXCLUDED.danceability,
                updated_at = EXCLUDED.updated_at
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(record.song_id)
        .bind(record.primary_mood.as_str())
        .bind(record.confidence)
        .bind(Json(&record.mood_tags))
        .bind(record.energy)
        .bind(record.valence)
        .bind(record.tempo)
        .bind(record.danceability)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(backend("replace track mood"))?;

        TrackMoodRecord::try_from(row)
    }

    async fn distribution(&self) -> StorageResult<Vec<MoodCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT primary_mood, COUNT(*)
            FROM track_mood_features
            GROUP BY primary_mood
            ORDER BY COUNT(*) DESC, primary_mood
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend("load mood distribution"))?;

        rows.into_iter()
            .map(|(mood, count)| -> StorageResult<MoodCount> {
                let mood = mood
                    .parse::<MoodLabel>()
                    .map_err(|e| StorageError::corrupt("track mood", e.to_string()))?;
                Ok(MoodCount { mood, count })
            })
            .collect()
    }
}
