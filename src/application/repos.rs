//! Repository traits describing persistence adapters.
//!
//! Both the Postgres store and the cache-aside wrappers implement these traits,
//! so services never know whether a read was served from the cache.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::cache::CacheError;
use crate::domain::entities::{PostRecord, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
    /// Cache failure on a write-through or invalidation path.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Filtered range scan over live posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostListFilter {
    pub owner: Option<Uuid>,
    pub published_only: bool,
}

impl PostListFilter {
    pub fn published() -> Self {
        Self {
            owner: None,
            published_only: true,
        }
    }

    pub fn published_by(owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            published_only: true,
        }
    }

    /// Every live post of `owner`, drafts included.
    pub fn owned_by(owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            published_only: false,
        }
    }
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn create(&self, user: &UserRecord) -> Result<(), RepoError>;

    async fn find(&self, id: Uuid) -> Result<UserRecord, RepoError>;

    /// Authentication lookup; implementations must always consult the store.
    async fn find_by_email(&self, email: &str) -> Result<UserRecord, RepoError>;

    async fn update(&self, user: &UserRecord) -> Result<(), RepoError>;
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<PostRecord, RepoError>;

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<PostRecord, RepoError>;

    async fn list_posts(
        &self,
        filter: PostListFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn count_posts(&self, filter: PostListFilter) -> Result<u64, RepoError>;

    async fn create(&self, post: &PostRecord) -> Result<(), RepoError>;

    async fn update(&self, post: &PostRecord) -> Result<(), RepoError>;

    async fn publish(&self, post: &PostRecord) -> Result<(), RepoError>;

    async fn soft_delete(&self, post: &PostRecord) -> Result<(), RepoError>;
}
