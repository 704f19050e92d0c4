//! Mood engine tuning

use std::time::Duration;

use crate::{parse_env, parse_optional_env, ConfigResult};

/// Runtime knobs for the mood recommendation engine
#[derive(Debug, Clone)]
pub struct MoodEngineConfig {
    /// Deadline applied to each catalog/store call, if any
    pub io_timeout_ms: Option<u64>,

    /// Serialize session read-modify-write per user
    pub serialize_sessions: bool,
}

impl MoodEngineConfig {
    /// Load mood engine configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            io_timeout_ms: parse_optional_env("MOOD_IO_TIMEOUT_MS")?,
            serialize_sessions: parse_env("MOOD_SERIALIZE_SESSIONS", true)?,
        })
    }

    /// Per-call I/O deadline as a [`Duration`]
    pub fn io_timeout(&self) -> Option<Duration> {
        self.io_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for MoodEngineConfig {
    fn default() -> Self {
        Self {
            io_timeout_ms: None,
            serialize_sessions: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MoodEngineConfig::default();
        assert!(config.io_timeout().is_none());
        assert!(config.serialize_sessions);
    }

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("MOOD_IO_TIMEOUT_MS", Some("1500")),
                ("MOOD_SERIALIZE_SESSIONS", Some("false")),
            ],
            || {
                let config = MoodEngineConfig::from_env().unwrap();
                assert_eq!(config.io_timeout(), Some(Duration::from_millis(1500)));
                assert!(!config.serialize_sessions);
            },
        );
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        temp_env::with_var("MOOD_IO_TIMEOUT_MS", Some("soon"), || {
            assert!(MoodEngineConfig::from_env().is_err());
        });
    }
}
