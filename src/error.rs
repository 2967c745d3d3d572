//! Error types for the expiring cache
//!
//! Cache operations are total and never fail; only configuration loading can.

use thiserror::Error;

// == Config Error Enum ==
/// Errors raised while loading a [`CacheConfig`](crate::CacheConfig).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Name of the offending variable
        var: &'static str,
        /// Raw value found in the environment
        value: String,
    },
}

// == Result Type Alias ==
/// Convenience Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;
