//! Key/value byte store consulted by the cache-aside repositories.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out")]
    Timeout,
    #[error("cache codec error: {0}")]
    Codec(String),
}

impl CacheError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Byte-string store with one global expiry owned by the implementation.
///
/// `get` returning `Ok(None)` is the miss signal; it is not an error.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

/// Bounds every call of the wrapped provider by a fixed timeout.
///
/// An elapsed call is dropped, which cancels it, and reported as
/// [`CacheError::Timeout`].
pub struct BoundedCacheProvider {
    inner: Arc<dyn CacheProvider>,
    timeout: Duration,
}

impl BoundedCacheProvider {
    pub fn new(inner: Arc<dyn CacheProvider>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| CacheError::Timeout)?
    }
}

#[async_trait]
impl CacheProvider for BoundedCacheProvider {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        self.bounded(self.inner.get(key)).await
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        self.bounded(self.inner.set(key, value)).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.bounded(self.inner.delete(key)).await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.bounded(self.inner.ping()).await
    }
}
