//! Listening sessions (`mood_session_context`)
//!
//! A partial unique index on `user_id WHERE is_active` keeps at most one
//! active row per user, so saving is a single upsert against that index.

use async_trait::async_trait;
use cadence_mood_engine::mood::DEFAULT_MOOD;
use cadence_mood_engine::{
    MoodLabel, SessionContext, SessionStore, StorageError, StorageResult, UserId,
};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use super::backend;

#[derive(Debug, FromRow)]
struct SessionRow {
    user_id: i64,
    current_dominant_mood: Option<String>,
    recent_track_ids: Json<Vec<i64>>,
    playback_context_type: Option<String>,
    context_id: Option<i64>,
    is_active: bool,
    session_start: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl TryFrom<SessionRow> for SessionContext {
    type Error = StorageError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let dominant_mood = match row.current_dominant_mood.as_deref() {
            Some(mood) => mood.parse::<MoodLabel>().map_err(|e| {
                StorageError::corrupt("session", format!("user {}: {e}", row.user_id))
            })?,
            None => DEFAULT_MOOD,
        };

        Ok(Self {
            user_id: row.user_id,
            recent_track_ids: row.recent_track_ids.0,
            dominant_mood,
            context_type: row
                .playback_context_type
                .as_deref()
                .map(|s| s.parse().unwrap_or_default())
                .unwrap_or_default(),
            context_id: row.context_id,
            active: row.is_active,
            session_start: row.session_start,
            last_updated: row.last_updated,
        })
    }
}

/// Repository for listening sessions
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new SessionRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn find_active(&self, user_id: UserId) -> StorageResult<Option<SessionContext>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT user_id, current_dominant_mood, recent_track_ids,
                   playback_context_type, context_id, is_active,
                   session_start, last_updated
            FROM mood_session_context
            WHERE user_id = $1 AND is_active = true
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend("load active session"))?;

        row.map(SessionContext::try_from).transpose()
    }

    async fn save_active(&self, session: &SessionContext) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO mood_session_context (
                user_id, current_dominant_mood, recent_track_ids,
                playback_context_type, context_id, is_active,
                session_start, last_updated
            )
            VALUES ($1, $2, $3, $4, $5, true, $6, $7)
            ON CONFLICT (user_id) WHERE is_active DO UPDATE SET
                current_dominant_mood = EXCLUDED.current_dominant_mood,
                recent_track_ids = EXCLUDED.recent_track_ids,
                playback_context_type = EXCLUDED.playback_context_type,
                context_id = EXCLUDED.context_id,
                last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(session.user_id)
        .bind(session.dominant_mood.as_str())
        .bind(Json(&session.recent_track_ids))
        .bind(session.context_type.as_str())
        .bind(session.context_id)
        .bind(session.session_start)
        .bind(session.last_updated)
        .execute(&self.pool)
        .await
        .map_err(backend("save active session"))?;

        Ok(())
    }

    async fn deactivate(&self, user_id: UserId) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE mood_session_context
            SET is_active = false, last_updated = NOW()
            WHERE user_id = $1 AND is_active = true
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(backend("deactivate session"))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_mood_engine::ContextType;

    fn row(mood: Option<&str>, context: Option<&str>) -> SessionRow {
        let now = Utc::now();
        SessionRow {
            user_id: 3,
            current_dominant_mood: mood.map(str::to_string),
            recent_track_ids: Json(vec![4, 5]),
            playback_context_type: context.map(str::to_string),
            context_id: None,
            is_active: true,
            session_start: now,
            last_updated: now,
        }
    }

    #[test]
    fn test_row_maps_to_session() {
        let session = SessionContext::try_from(row(Some("sad"), Some("liked"))).unwrap();
        assert_eq!(session.dominant_mood, MoodLabel::Sad);
        assert_eq!(session.context_type, ContextType::Liked);
        assert_eq!(session.recent_track_ids, vec![4, 5]);
    }

    #[test]
    fn test_legacy_context_reads_as_fallback() {
        let session = SessionContext::try_from(row(None, Some("album"))).unwrap();
        assert_eq!(session.context_type, ContextType::Fallback);
        assert_eq!(session.dominant_mood, MoodLabel::Happy);
    }

    #[test]
    fn test_unknown_mood_is_corrupt() {
        let err = SessionContext::try_from(row(Some("lofi"), None)).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { entity: "session", .. }));
    }
}
