//! Redis configuration types

use crate::{get_env_or_default, parse_env, ConfigResult};

const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
const DEFAULT_JOB_QUEUE: &str = "cadence:mood:jobs";

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,

    /// Optional password for Redis authentication
    pub password: Option<String>,

    /// List key that mood jobs are pushed to
    pub job_queue: String,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl RedisConfig {
    /// Load Redis configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            url: get_env_or_default("REDIS_URL", DEFAULT_REDIS_URL),
            password: std::env::var("REDIS_PASSWORD").ok().filter(|s| !s.is_empty()),
            job_queue: get_env_or_default("MOOD_JOB_QUEUE", DEFAULT_JOB_QUEUE),
            connect_timeout_secs: parse_env("REDIS_CONNECT_TIMEOUT", 5)?,
        })
    }

    /// Create a configuration with a custom URL (useful for testing)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Build the full connection URL including password if set
    pub fn connection_url(&self) -> String {
        if let Some(ref password) = self.password {
            if let Some(at_pos) = self.url.find("://") {
                let (scheme, rest) = self.url.split_at(at_pos + 3);
                return format!("{}:{}@{}", scheme, password, rest);
            }
        }
        self.url.clone()
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            password: None,
            job_queue: DEFAULT_JOB_QUEUE.to_string(),
            connect_timeout_secs: 5,
        }
    }
}
