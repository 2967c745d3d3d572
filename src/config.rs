//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::error::{ConfigError, Result};

/// Environment variable holding the default TTL in seconds.
pub const DEFAULT_TTL_VAR: &str = "CACHE_DEFAULT_TTL";

/// Environment variable holding the entry limit (0 = unbounded).
pub const MAX_ENTRIES_VAR: &str = "CACHE_MAX_ENTRIES";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied when a write carries no explicit expiration
    pub default_ttl: Duration,
    /// Maximum number of entries the store holds, None = unbounded
    pub max_entries: Option<usize>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 180)
    /// - `CACHE_MAX_ENTRIES` - Entry limit, 0 for unbounded (default: unbounded)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: env::var(DEFAULT_TTL_VAR)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_ttl),
            max_entries: env::var(MAX_ENTRIES_VAR)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .map(max_entries_from)
                .unwrap_or(defaults.max_entries),
        }
    }

    /// Strict variant of [`from_env`](Self::from_env).
    ///
    /// Missing variables still take their defaults, but a present value that
    /// does not parse is reported instead of ignored.
    pub fn try_from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            default_ttl: parse_var::<u64>(DEFAULT_TTL_VAR)?
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_ttl),
            max_entries: parse_var::<usize>(MAX_ENTRIES_VAR)?
                .map(max_entries_from)
                .unwrap_or(defaults.max_entries),
        })
    }

    /// Sets the default TTL.
    pub fn with_default_ttl(mut self, default_ttl: Duration) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    /// Sets the entry limit; 0 means unbounded.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries_from(max_entries);
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            max_entries: None,
        }
    }
}

fn max_entries_from(value: usize) -> Option<usize> {
    (value > 0).then_some(value)
}

fn parse_var<T: FromStr>(var: &'static str) -> Result<Option<T>> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        Err(_) => Ok(None),
    }
}
