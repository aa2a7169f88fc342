use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::application::repos::{PostListFilter, PostsRepo, RepoError};
use crate::domain::entities::PostRecord;

use super::aside::CacheAside;
use super::keys::CacheKey;

/// [`PostsRepo`] that consults the cache before the wrapped store.
///
/// Single-post reads are cached under one key per post. Listings and counts
/// always reflect the store.
pub struct CachedPostsRepo {
    inner: Arc<dyn PostsRepo>,
    cache: CacheAside<PostRecord>,
}

impl CachedPostsRepo {
    pub fn new(inner: Arc<dyn PostsRepo>, cache: CacheAside<PostRecord>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl PostsRepo for CachedPostsRepo {
    async fn find(&self, id: Uuid) -> Result<PostRecord, RepoError> {
        self.cache
            .read_through(CacheKey::Post(id), "find", self.inner.find(id))
            .await
    }

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<PostRecord, RepoError> {
        let key = CacheKey::Post(id);

        // Shares the key with `find`, so a hit may belong to someone else.
        if let Some(post) = self.cache.lookup(key, "find_owned").await {
            if post.belongs_to(owner) {
                return Ok(post);
            }
            debug!(
                target = "cache::posts",
                post_id = %id,
                "Cached post belongs to another user"
            );
            return Err(RepoError::NotFound);
        }

        let post = self.inner.find_owned(id, owner).await?;
        self.cache.populate(key, &post, "find_owned").await;
        Ok(post)
    }

    async fn list_posts(
        &self,
        filter: PostListFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostRecord>, RepoError> {
        self.inner.list_posts(filter, offset, limit).await
    }

    async fn count_posts(&self, filter: PostListFilter) -> Result<u64, RepoError> {
        self.inner.count_posts(filter).await
    }

    async fn create(&self, post: &PostRecord) -> Result<(), RepoError> {
        self.cache
            .write_through(CacheKey::Post(post.id), "create", post, self.inner.create(post))
            .await
    }

    async fn update(&self, post: &PostRecord) -> Result<(), RepoError> {
        self.cache
            .write_through(CacheKey::Post(post.id), "update", post, self.inner.update(post))
            .await
    }

    async fn publish(&self, post: &PostRecord) -> Result<(), RepoError> {
        self.cache
            .write_through(CacheKey::Post(post.id), "publish", post, self.inner.publish(post))
            .await
    }

    async fn soft_delete(&self, post: &PostRecord) -> Result<(), RepoError> {
        self.cache
            .invalidate(CacheKey::Post(post.id), "soft_delete", self.inner.soft_delete(post))
            .await
    }
}
