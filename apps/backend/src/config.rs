//! Service configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use vocab_core::{ConfigError, GradingPolicy, DEFAULT_INTERVALS};

use crate::error::Result;

const DEFAULT_XP_PER_CORRECT: u32 = 10;
const DEFAULT_HISTORY_LIMIT: usize = 20;
const DEFAULT_LEADERBOARD_LIMIT: usize = 100;
const DEFAULT_SET_CACHE_TTL_SECS: u64 = 600;
const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

/// Runtime settings for the grading service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_url: String,
    pub policy: GradingPolicy,
    pub history_limit: usize,
    pub leaderboard_limit: usize,
    pub set_cache_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            policy: GradingPolicy::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            set_cache_ttl: Duration::from_secs(DEFAULT_SET_CACHE_TTL_SECS),
        }
    }
}

impl ServiceConfig {
    /// Load settings from the process environment.
    ///
    /// Optional env vars:
    /// - DATABASE_URL: SQLite connection string (default in-memory)
    /// - XP_PER_CORRECT: XP per correct answer (default 10)
    /// - SRS_INTERVALS: comma-separated review intervals in days
    /// - HISTORY_LIMIT: quiz history entries returned (default 20)
    /// - LEADERBOARD_LIMIT: leaderboard size (default 100)
    /// - SET_CACHE_TTL_SECS: set listing cache lifetime (default 600)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let xp_per_correct = parse_setting(&lookup, "XP_PER_CORRECT", DEFAULT_XP_PER_CORRECT)?;
        let intervals = match lookup("SRS_INTERVALS") {
            Some(raw) => parse_intervals(&raw)?,
            None => DEFAULT_INTERVALS.to_vec(),
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            policy: GradingPolicy::new(xp_per_correct, intervals)?,
            history_limit: parse_setting(&lookup, "HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?,
            leaderboard_limit: parse_setting(
                &lookup,
                "LEADERBOARD_LIMIT",
                DEFAULT_LEADERBOARD_LIMIT,
            )?,
            set_cache_ttl: Duration::from_secs(parse_setting(
                &lookup,
                "SET_CACHE_TTL_SECS",
                DEFAULT_SET_CACHE_TTL_SECS,
            )?),
        })
    }
}

fn parse_setting<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| invalid(key, &raw)),
        None => Ok(default),
    }
}

fn parse_intervals(raw: &str) -> Result<Vec<u32>> {
    raw.split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| invalid("SRS_INTERVALS", raw))
}

fn invalid(key: &str, value: &str) -> crate::error::ServiceError {
    ConfigError::InvalidSetting {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}
