use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::error::ConfigError;
use crate::keywords::ExtractorKind;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_LIKE_QUEUE_KEY: &str = "likes:created";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub like_queue_key: String,
    pub db_max_connections: u32,
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    pub extractor: ExtractorKind,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            redis_url: try_load("REDIS_URL", DEFAULT_REDIS_URL)?,
            like_queue_key: try_load("LIKE_QUEUE_KEY", DEFAULT_LIKE_QUEUE_KEY)?,
            db_max_connections: try_load("DB_MAX_CONNECTIONS", "5")?,
            poll_interval: Duration::from_millis(try_load("POLL_INTERVAL_MS", "1000")?),
            error_backoff: Duration::from_millis(try_load("ERROR_BACKOFF_MS", "5000")?),
            extractor: try_load("KEYWORD_EXTRACTOR", "phrases")?,
        })
    }
}

/// An environment variable, with blank values treated as unset.
pub fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: value.clone(),
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names; the process environment is shared.

    #[test]
    fn test_try_load_default() {
        let n: u32 = try_load("REVIEW_INSIGHTS_TEST_UNSET", "7").unwrap();
        assert_eq!(n, 7);
    }

    #[test]
    fn test_blank_var_is_unset() {
        env::set_var("REVIEW_INSIGHTS_TEST_BLANK", "   ");
        assert_eq!(var("REVIEW_INSIGHTS_TEST_BLANK"), None);
        env::set_var("REVIEW_INSIGHTS_TEST_SET", "likes:other");
        assert_eq!(var("REVIEW_INSIGHTS_TEST_SET").as_deref(), Some("likes:other"));
    }

    #[test]
    fn test_try_load_invalid() {
        env::set_var("REVIEW_INSIGHTS_TEST_BAD_NUMBER", "many");
        let err = try_load::<u32>("REVIEW_INSIGHTS_TEST_BAD_NUMBER", "5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "REVIEW_INSIGHTS_TEST_BAD_NUMBER", .. }));
    }

    #[test]
    fn test_try_load_extractor() {
        env::set_var("REVIEW_INSIGHTS_TEST_EXTRACTOR", "nouns");
        let kind: ExtractorKind = try_load("REVIEW_INSIGHTS_TEST_EXTRACTOR", "phrases").unwrap();
        assert_eq!(kind, ExtractorKind::Nouns);
    }
}
