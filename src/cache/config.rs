//! Cache configuration.
//!
//! Built from the `[cache]` settings section; tests construct it directly.

use std::{num::NonZeroUsize, time::Duration};

pub(crate) const DEFAULT_EXPIRES_SECONDS: u64 = 300;
/// Longest accepted entry lifetime (30 days).
pub(crate) const MAX_EXPIRES_SECONDS: u64 = 60 * 60 * 24 * 30;
pub(crate) const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 250;
pub(crate) const DEFAULT_MEMORY_CAPACITY: NonZeroUsize = NonZeroUsize::new(1024).unwrap();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
}

impl CacheBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheBackend::Redis => "redis",
            CacheBackend::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Connection URL; required for the Redis backend.
    pub url: Option<String>,
    /// Global expiry applied to every entry.
    pub expires: Duration,
    /// Upper bound for a single provider call.
    pub operation_timeout: Duration,
    /// Optional namespace prepended to every key.
    pub key_prefix: Option<String>,
    /// Maximum entries held by the in-memory backend.
    pub memory_capacity: NonZeroUsize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            url: None,
            expires: Duration::from_secs(DEFAULT_EXPIRES_SECONDS),
            operation_timeout: Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
            key_prefix: None,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            backend: settings.backend,
            url: settings.url.clone(),
            expires: settings.expires,
            operation_timeout: settings.operation_timeout,
            key_prefix: settings.key_prefix.clone(),
            memory_capacity: settings.memory_capacity,
        }
    }
}

impl CacheConfig {
    /// Expiry in whole seconds as sent to Redis `SET EX`.
    pub fn expires_seconds(&self) -> u64 {
        self.expires.as_secs().clamp(1, MAX_EXPIRES_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, CacheBackend::Memory);
        assert_eq!(config.expires, Duration::from_secs(300));
        assert_eq!(config.operation_timeout, Duration::from_millis(250));
        assert_eq!(config.memory_capacity.get(), 1024);
        assert!(config.key_prefix.is_none());
    }

    #[test]
    fn oversized_expiry_is_capped_for_redis() {
        let config = CacheConfig {
            expires: Duration::from_secs(u64::MAX),
            ..Default::default()
        };
        assert_eq!(config.expires_seconds(), MAX_EXPIRES_SECONDS);
    }

    #[test]
    fn sub_second_expiry_rounds_up_for_redis() {
        let config = CacheConfig {
            expires: Duration::from_millis(10),
            ..Default::default()
        };
        assert_eq!(config.expires_seconds(), 1);
    }
}
