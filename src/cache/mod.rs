//! Plume cache-aside layer.
//!
//! Wraps the Postgres repositories behind the same [`UsersRepo`] and
//! [`PostsRepo`] traits while consulting a byte-string cache:
//!
//! - **Provider**: Redis in production or an in-process LRU, each with one
//!   global expiry and a per-call timeout
//! - **Codec**: JSON encoding of the cached entities
//! - **Repositories**: read-through single-entity lookups, write-through
//!   create/update/publish, invalidate-then-write soft deletes
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! backend = "redis"
//! url = "redis://127.0.0.1:6379"
//! expires_seconds = 300
//! operation_timeout_ms = 250
//! ```
//!
//! [`UsersRepo`]: crate::application::repos::UsersRepo
//! [`PostsRepo`]: crate::application::repos::PostsRepo

mod aside;
mod codec;
mod config;
mod keys;
mod memory;
mod posts;
mod provider;
mod users;

pub use aside::{CACHE_ERROR_TOTAL, CACHE_HIT_TOTAL, CACHE_MISS_TOTAL, CacheAside};
pub use codec::{CodecError, EntityCodec, JsonCodec};
pub use config::{CacheBackend, CacheConfig};
pub(crate) use config::{
    DEFAULT_EXPIRES_SECONDS, DEFAULT_MEMORY_CAPACITY, DEFAULT_OPERATION_TIMEOUT_MS,
    MAX_EXPIRES_SECONDS,
};
pub use keys::CacheKey;
pub use memory::MemoryCacheProvider;
pub use posts::CachedPostsRepo;
pub use provider::{BoundedCacheProvider, CacheError, CacheProvider};
pub use users::CachedUsersRepo;
