//! Cache-aside primitives shared by the per-entity repositories.
//!
//! Reads tolerate any cache malfunction: a failed `get`, a corrupted entry or a
//! failed populate is logged and counted, and the store stays authoritative.
//! Writes do not: once the store mutation succeeded, a failed cache `set` is
//! returned to the caller so a stale entry is never silently left behind.
//! Invalidation runs before the store mutation and aborts it on failure.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use crate::application::repos::RepoError;

use super::codec::EntityCodec;
use super::keys::CacheKey;
use super::provider::{CacheError, CacheProvider};

const SOURCE: &str = "cache::aside";

pub const CACHE_HIT_TOTAL: &str = "plume_cache_hit_total";
pub const CACHE_MISS_TOTAL: &str = "plume_cache_miss_total";
pub const CACHE_ERROR_TOTAL: &str = "plume_cache_error_total";

fn record(metric: &'static str, entity: &'static str, op: &'static str) {
    counter!(metric, "entity" => entity, "op" => op).increment(1);
}

pub struct CacheAside<E> {
    provider: Arc<dyn CacheProvider>,
    codec: Arc<dyn EntityCodec<E>>,
    entity: &'static str,
    prefix: Option<String>,
}

impl<E> Clone for CacheAside<E> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            codec: self.codec.clone(),
            entity: self.entity,
            prefix: self.prefix.clone(),
        }
    }
}

impl<E> CacheAside<E>
where
    E: Send + Sync,
{
    pub fn new(
        provider: Arc<dyn CacheProvider>,
        codec: Arc<dyn EntityCodec<E>>,
        entity: &'static str,
    ) -> Self {
        Self {
            provider,
            codec,
            entity,
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix.filter(|prefix| !prefix.is_empty());
        self
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn key(&self, key: CacheKey) -> String {
        key.render(self.prefix.as_deref())
    }

    /// Cached copy of `key`, or `None` on a miss or any cache failure.
    pub async fn lookup(&self, key: CacheKey, op: &'static str) -> Option<E> {
        let rendered = self.key(key);
        let bytes = match self.provider.get(&rendered).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                record(CACHE_MISS_TOTAL, self.entity, op);
                debug!(target = SOURCE, entity = self.entity, op, key = %rendered, "Cache miss");
                return None;
            }
            Err(err) => {
                self.read_failure(op, &rendered, &err);
                return None;
            }
        };

        match self.codec.decode(&bytes) {
            Ok(entity) => {
                record(CACHE_HIT_TOTAL, self.entity, op);
                debug!(target = SOURCE, entity = self.entity, op, key = %rendered, "Cache hit");
                Some(entity)
            }
            Err(err) => {
                self.read_failure(op, &rendered, &CacheError::from(err));
                None
            }
        }
    }

    /// Best-effort fill after a store read; failures are only logged.
    pub async fn populate(&self, key: CacheKey, entity: &E, op: &'static str) {
        let rendered = self.key(key);
        let result = match self.codec.encode(entity) {
            Ok(bytes) => self.provider.set(&rendered, bytes).await,
            Err(err) => Err(CacheError::from(err)),
        };
        if let Err(err) = result {
            self.read_failure(op, &rendered, &err);
        }
    }

    /// Serve `key` from the cache, falling back to `load` and populating on success.
    ///
    /// Store errors, `NotFound` included, are returned untouched and never
    /// populate the cache.
    pub async fn read_through(
        &self,
        key: CacheKey,
        op: &'static str,
        load: impl Future<Output = Result<E, RepoError>> + Send,
    ) -> Result<E, RepoError> {
        if let Some(entity) = self.lookup(key, op).await {
            return Ok(entity);
        }

        let entity = load.await?;
        self.populate(key, &entity, op).await;
        Ok(entity)
    }

    /// Run `store`, then cache `entity` under `key`.
    ///
    /// The entity is encoded before the store is touched, so an unencodable
    /// entity aborts the whole write. A failed `set` after a successful store
    /// write is returned as [`RepoError::Cache`].
    pub async fn write_through(
        &self,
        key: CacheKey,
        op: &'static str,
        entity: &E,
        store: impl Future<Output = Result<(), RepoError>> + Send,
    ) -> Result<(), RepoError> {
        let rendered = self.key(key);
        let bytes = self
            .codec
            .encode(entity)
            .map_err(|err| self.write_failure(op, &rendered, CacheError::from(err)))?;

        store.await?;

        self.provider
            .set(&rendered, bytes)
            .await
            .map_err(|err| self.write_failure(op, &rendered, err))?;
        debug!(target = SOURCE, entity = self.entity, op, key = %rendered, "Cache entry written");
        Ok(())
    }

    /// Delete the cached entry for `key`, then run `store`.
    ///
    /// When the delete fails `store` is dropped without being polled.
    pub async fn invalidate(
        &self,
        key: CacheKey,
        op: &'static str,
        store: impl Future<Output = Result<(), RepoError>> + Send,
    ) -> Result<(), RepoError> {
        let rendered = self.key(key);
        self.provider
            .delete(&rendered)
            .await
            .map_err(|err| self.write_failure(op, &rendered, err))?;
        debug!(target = SOURCE, entity = self.entity, op, key = %rendered, "Cache entry invalidated");

        store.await
    }

    fn read_failure(&self, op: &'static str, key: &str, err: &CacheError) {
        record(CACHE_ERROR_TOTAL, self.entity, op);
        warn!(
            target = SOURCE,
            entity = self.entity,
            op,
            key,
            error = %err,
            "Cache read path failed; serving from store"
        );
    }

    fn write_failure(&self, op: &'static str, key: &str, err: CacheError) -> RepoError {
        record(CACHE_ERROR_TOTAL, self.entity, op);
        warn!(
            target = SOURCE,
            entity = self.entity,
            op,
            key,
            error = %err,
            "Cache write path failed"
        );
        RepoError::Cache(err)
    }
}
