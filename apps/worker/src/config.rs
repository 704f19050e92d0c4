//! Worker configuration loaded from environment variables
//!
//! Configuration is loaded from environment variables with sensible defaults
//! for development environments. Sections shared with other services live in
//! `cadence-shared-config`.

use std::time::Duration;

use anyhow::{Context, Result};
use cadence_shared_config::{
    parse_env, CommonConfig, DatabaseConfig, Environment, MoodEngineConfig, RedisConfig,
};

/// Default number of songs classified per backfill batch
pub const DEFAULT_BACKFILL_BATCH_SIZE: usize = 100;

/// Worker configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,

    /// Seconds a queue poll blocks before checking for shutdown
    pub poll_interval_secs: u64,

    /// Songs classified per backfill batch unless a job overrides it
    pub backfill_batch_size: usize,

    /// Upper bound on a single job's run time, in seconds
    pub job_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let common = CommonConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        let backfill_batch_size: usize =
            parse_env("MOOD_BACKFILL_BATCH_SIZE", DEFAULT_BACKFILL_BATCH_SIZE)
                .context("Invalid MOOD_BACKFILL_BATCH_SIZE value")?;
        if backfill_batch_size == 0 {
            anyhow::bail!("MOOD_BACKFILL_BATCH_SIZE must be greater than zero");
        }

        Ok(Self {
            common,
            poll_interval_secs: parse_env("WORKER_POLL_INTERVAL", 5)
                .context("Invalid WORKER_POLL_INTERVAL value")?,
            backfill_batch_size,
            job_timeout_secs: parse_env("WORKER_JOB_TIMEOUT", 600)
                .context("Invalid WORKER_JOB_TIMEOUT value")?,
        })
    }

    /// Get database configuration
    pub fn database(&self) -> &DatabaseConfig {
        &self.common.database
    }

    /// Get Redis configuration
    pub fn redis(&self) -> &RedisConfig {
        &self.common.redis
    }

    /// Get mood engine configuration
    pub fn mood(&self) -> &MoodEngineConfig {
        &self.common.mood
    }

    /// Get environment mode
    pub fn environment(&self) -> Environment {
        self.common.environment
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.common.environment.is_production()
    }
}
