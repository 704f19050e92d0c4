//! Per-user mood mode settings (`user_mood_settings`)

use async_trait::async_trait;
use cadence_mood_engine::{PreferenceStore, Smoothness, StorageResult, UserId, UserMoodPreference};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::backend;

#[derive(Debug, FromRow)]
struct PreferenceRow {
    user_id: i64,
    mood_ai_enabled: bool,
    transition_smoothness: Option<String>,
    last_toggle_at: DateTime<Utc>,
}

impl From<PreferenceRow> for UserMoodPreference {
    fn from(row: PreferenceRow) -> Self {
        Self {
            user_id: row.user_id,
            enabled: row.mood_ai_enabled,
            transition_smoothness: row
                .transition_smoothness
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            last_toggle_at: row.last_toggle_at,
        }
    }
}

/// Repository for mood mode settings
#[derive(Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    /// Create a new PreferenceRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PreferenceRepository {
    async fn find(&self, user_id: UserId) -> StorageResult<Option<UserMoodPreference>> {
        let row = sqlx::query_as::<_, PreferenceRow>(
            r#"
            SELECT user_id, mood_ai_enabled, transition_smoothness, last_toggle_at
            FROM user_mood_settings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend("load mood preference"))?;

        Ok(row.map(UserMoodPreference::from))
    }

    async fn upsert(
        &self,
        user_id: UserId,
        enabled: bool,
        smoothness: Smoothness,
    ) -> StorageResult<UserMoodPreference> {
        let row = sqlx::query_as::<_, PreferenceRow>(
            r#"
            INSERT INTO user_mood_settings (
                user_id, mood_ai_enabled, transition_smoothness,
                last_toggle_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, NOW(), NOW(), NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                mood_ai_enabled = EXCLUDED.mood_ai_enabled,
                transition_smoothness = EXCLUDED.transition_smoothness,
                last_toggle_at = NOW(),
                updated_at = NOW()
            RETURNING user_id, mood_ai_enabled, transition_smoothness, last_toggle_at
            "#,
        )
        .bind(user_id)
        .bind(enabled)
        .bind(smoothness.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(backend("save mood preference"))?;

        Ok(row.into())
    }
}
