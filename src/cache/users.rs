use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

use super::aside::CacheAside;
use super::keys::CacheKey;

/// [`UsersRepo`] that consults the cache before the wrapped store.
///
/// Lookups by email always go to the store. Cached users never carry the
/// password hash, so anything that needs it must use `find_by_email`.
pub struct CachedUsersRepo {
    inner: Arc<dyn UsersRepo>,
    cache: CacheAside<UserRecord>,
}

impl CachedUsersRepo {
    pub fn new(inner: Arc<dyn UsersRepo>, cache: CacheAside<UserRecord>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl UsersRepo for CachedUsersRepo {
    async fn create(&self, user: &UserRecord) -> Result<(), RepoError> {
        self.cache
            .write_through(CacheKey::User(user.id), "create", user, self.inner.create(user))
            .await
    }

    async fn find(&self, id: Uuid) -> Result<UserRecord, RepoError> {
        self.cache
            .read_through(CacheKey::User(id), "find", self.inner.find(id))
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<UserRecord, RepoError> {
        self.inner.find_by_email(email).await
    }

    async fn update(&self, user: &UserRecord) -> Result<(), RepoError> {
        self.cache
            .write_through(CacheKey::User(user.id), "update", user, self.inner.update(user))
            .await
    }
}
