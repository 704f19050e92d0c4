//! Redis-backed job queue
//!
//! Producers `LPUSH` JSON payloads onto the list named by `MOOD_JOB_QUEUE`;
//! the worker takes them from the other end with a blocking `BRPOP`, so jobs
//! are processed in arrival order.

use std::time::Duration;

use cadence_shared_config::RedisConfig;
use redis::aio::MultiplexedConnection;

use crate::error::{WorkerError, WorkerResult};

/// Consumer handle for the mood job list
#[derive(Clone)]
pub struct JobQueue {
    conn: MultiplexedConnection,
    key: String,
}

impl JobQueue {
    /// Connect and verify the server answers
    pub async fn connect(config: &RedisConfig) -> WorkerResult<Self> {
        let client = redis::Client::open(config.connection_url().as_str())?;
        let mut conn = client.get_multiplexed_async_connection().await?;

        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        tracing::info!(queue = %config.job_queue, "Redis connected for job queue");

        Ok(Self {
            conn,
            key: config.job_queue.clone(),
        })
    }

    /// Wait up to `wait` for the next raw payload
    pub async fn pop(&self, wait: Duration) -> WorkerResult<Option<String>> {
        let mut conn = self.conn.clone();
        // BRPOP treats 0 as "block forever"
        let reply: Option<Vec<String>> = redis::cmd("BRPOP")
            .arg(&self.key)
            .arg(wait.as_secs().max(1))
            .query_async(&mut conn)
            .await?;

        payload_from_reply(reply)
    }
}

/// Extract the payload from a `BRPOP` reply (`nil` or `[list, payload]`)
pub fn payload_from_reply(reply: Option<Vec<String>>) -> WorkerResult<Option<String>> {
    match reply {
        None => Ok(None),
        Some(parts) => match <[String; 2]>::try_from(parts) {
            Ok([_, payload]) => Ok(Some(payload)),
            Err(parts) => Err(WorkerError::Queue(format!(
                "unexpected BRPOP reply with {} elements",
                parts.len()
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_timeout_reply_is_empty() {
        assert_eq!(payload_from_reply(None).unwrap(), None);
    }

    #[test]
    fn test_reply_yields_payload() {
        let reply = vec![
            "cadence:mood:jobs".to_string(),
            r#"{"type":"session_ended","user_id":4}"#.to_string(),
        ];
        assert_eq!(
            payload_from_reply(Some(reply)).unwrap().as_deref(),
            Some(r#"{"type":"session_ended","user_id":4}"#)
        );
    }

    #[test]
    fn test_malformed_reply_is_queue_error() {
        let err = payload_from_reply(Some(vec!["cadence:mood:jobs".to_string()])).unwrap_err();
        assert!(err.is_retryable());
        assert_matches!(err, WorkerError::Queue(msg) if msg.contains("1 elements"));
    }
}
