//! In-memory doubles shared by the integration tests.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    num::NonZeroUsize,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use plume::{
    application::repos::{PostListFilter, PostsRepo, RepoError, UsersRepo},
    cache::{CacheConfig, CacheError, CacheProvider, MemoryCacheProvider},
    context::CacheLayer,
    domain::entities::{PostRecord, UserRecord, to_store_precision},
};
use time::OffsetDateTime;
use uuid::Uuid;

/// Shared, ordered log of every store and cache call.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Store double backed by hash maps; behaves like the Postgres store for live rows,
/// including the microsecond precision of persisted timestamps.
pub struct InMemoryStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
    posts: Mutex<HashMap<Uuid, PostRecord>>,
    log: CallLog,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            posts: Mutex::new(HashMap::new()),
            log,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn seed_post(&self, post: PostRecord) {
        self.posts.lock().unwrap().insert(post.id, post);
    }

    pub fn seed_user(&self, user: UserRecord) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    /// Row as stored, including soft-deleted rows.
    pub fn raw_post(&self, id: Uuid) -> Option<PostRecord> {
        self.posts.lock().unwrap().get(&id).cloned()
    }

    /// Mutate a row behind the cache's back.
    pub fn overwrite_post(&self, post: PostRecord) {
        self.posts.lock().unwrap().insert(post.id, post);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), RepoError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(RepoError::from_persistence("store unavailable"))
        } else {
            Ok(())
        }
    }

    fn check_write(&self) -> Result<(), RepoError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(RepoError::from_persistence("store unavailable"))
        } else {
            Ok(())
        }
    }

    fn persisted_post(post: &PostRecord) -> PostRecord {
        PostRecord {
            published_at: post.published_at.map(to_store_precision),
            created_at: to_store_precision(post.created_at),
            updated_at: to_store_precision(post.updated_at),
            deleted_at: post.deleted_at.map(to_store_precision),
            ..post.clone()
        }
    }

    fn persisted_user(user: &UserRecord) -> UserRecord {
        UserRecord {
            created_at: to_store_precision(user.created_at),
            updated_at: to_store_precision(user.updated_at),
            deleted_at: user.deleted_at.map(to_store_precision),
            ..user.clone()
        }
    }

    fn matches(post: &PostRecord, filter: PostListFilter) -> bool {
        !post.is_deleted()
            && (!filter.published_only || post.is_published())
            && filter.owner.is_none_or(|owner| post.user_id == owner)
    }
}

#[async_trait]
impl UsersRepo for InMemoryStore {
    async fn create(&self, user: &UserRecord) -> Result<(), RepoError> {
        self.log.push("store.create_user");
        self.check_write()?;
        let mut users = self.users.lock().unwrap();
        if users
            .values()
            .any(|existing| !existing.is_deleted() && existing.email == user.email)
        {
            return Err(RepoError::Duplicate {
                constraint: "users_email_key".to_string(),
            });
        }
        users.insert(user.id, Self::persisted_user(user));
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<UserRecord, RepoError> {
        self.log.push("store.find_user");
        self.check_read()?;
        self.users
            .lock()
            .unwrap()
            .get(&id)
            .filter(|user| !user.is_deleted())
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<UserRecord, RepoError> {
        self.log.push("store.find_user_by_email");
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|user| !user.is_deleted() && user.email == email)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn update(&self, user: &UserRecord) -> Result<(), RepoError> {
        self.log.push("store.update_user");
        self.check_write()?;
        let mut users = self.users.lock().unwrap();
        match users.get_mut(&user.id).filter(|stored| !stored.is_deleted()) {
            Some(stored) => {
                stored.username = user.username.clone();
                stored.updated_at = to_store_precision(user.updated_at);
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostsRepo for InMemoryStore {
    async fn find(&self, id: Uuid) -> Result<PostRecord, RepoError> {
        self.log.push("store.find_post");
        self.check_read()?;
        self.posts
            .lock()
            .unwrap()
            .get(&id)
            .filter(|post| !post.is_deleted())
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<PostRecord, RepoError> {
        self.log.push("store.find_owned_post");
        self.check_read()?;
        self.posts
            .lock()
            .unwrap()
            .get(&id)
            .filter(|post| !post.is_deleted() && post.belongs_to(owner))
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn list_posts(
        &self,
        filter: PostListFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostRecord>, RepoError> {
        self.log.push("store.list_posts");
        let mut posts: Vec<PostRecord> = self
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|post| Self::matches(post, filter))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_posts(&self, filter: PostListFilter) -> Result<u64, RepoError> {
        self.log.push("store.count_posts");
        Ok(self
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|post| Self::matches(post, filter))
            .count() as u64)
    }

    async fn create(&self, post: &PostRecord) -> Result<(), RepoError> {
        self.log.push("store.create_post");
        self.check_write()?;
        self.posts
            .lock()
            .unwrap()
            .insert(post.id, Self::persisted_post(post));
        Ok(())
    }

    async fn update(&self, post: &PostRecord) -> Result<(), RepoError> {
        self.log.push("store.update_post");
        self.check_write()?;
        self.replace_live(post)
    }

    async fn publish(&self, post: &PostRecord) -> Result<(), RepoError> {
        self.log.push("store.publish_post");
        self.check_write()?;
        self.replace_live(post)
    }

    async fn soft_delete(&self, post: &PostRecord) -> Result<(), RepoError> {
        self.log.push("store.soft_delete_post");
        self.check_write()?;
        let mut posts = self.posts.lock().unwrap();
        match posts.get_mut(&post.id).filter(|stored| !stored.is_deleted()) {
            Some(stored) => {
                stored.updated_at = to_store_precision(post.updated_at);
                stored.deleted_at =
                    Some(to_store_precision(post.deleted_at.unwrap_or(post.updated_at)));
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }
}

impl InMemoryStore {
    fn replace_live(&self, post: &PostRecord) -> Result<(), RepoError> {
        let mut posts = self.posts.lock().unwrap();
        match posts.get_mut(&post.id).filter(|stored| !stored.is_deleted()) {
            Some(stored) => {
                *stored = Self::persisted_post(post);
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }
}

/// Cache provider double: a real in-memory provider plus call logging and failure switches.
pub struct RecordingCache {
    inner: MemoryCacheProvider,
    log: CallLog,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    fail_delete: AtomicBool,
}

impl RecordingCache {
    pub fn new(log: CallLog) -> Self {
        Self {
            inner: MemoryCacheProvider::new(
                NonZeroUsize::new(64).unwrap(),
                Duration::from_secs(60),
            ),
            log,
            fail_get: AtomicBool::new(false),
            fail_set: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        }
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Write raw bytes without logging, e.g. to plant a corrupted entry.
    pub async fn plant(&self, key: &str, value: &'static [u8]) {
        self.inner
            .set(key, Bytes::from_static(value))
            .await
            .unwrap();
    }

    /// Drop an entry without logging, as an expiry would.
    pub async fn evict(&self, key: &str) {
        self.inner.delete(key).await.unwrap();
    }

    /// Read raw bytes without logging.
    pub async fn peek(&self, key: &str) -> Option<Bytes> {
        self.inner.get(key).await.unwrap()
    }

    fn outage() -> CacheError {
        CacheError::Unavailable("connection refused".to_string())
    }
}

#[async_trait]
impl CacheProvider for RecordingCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        self.log.push("cache.get");
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        self.log.push("cache.set");
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.log.push("cache.delete");
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        self.inner.delete(key).await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.inner.ping().await
    }
}

/// Store, cache and cached repositories sharing one call log.
pub struct Harness {
    pub log: CallLog,
    pub store: Arc<InMemoryStore>,
    pub cache: Arc<RecordingCache>,
    pub layer: CacheLayer,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        let log = CallLog::default();
        let store = Arc::new(InMemoryStore::new(log.clone()));
        let cache = Arc::new(RecordingCache::new(log.clone()));
        let layer = CacheLayer::new(cache.clone(), &config, store.clone(), store.clone());
        Self {
            log,
            store,
            cache,
            layer,
        }
    }
}

pub const CONTENT: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ";

pub fn long_content() -> String {
    CONTENT.repeat(10)
}

pub fn post_at(owner: Uuid, published: bool, created_at: OffsetDateTime) -> PostRecord {
    PostRecord::new(
        owner,
        "A reasonably long title".to_string(),
        "a-reasonably-long-title".to_string(),
        long_content(),
        published.then_some(created_at),
        created_at,
    )
}

pub fn post(owner: Uuid, published: bool) -> PostRecord {
    post_at(owner, published, OffsetDateTime::now_utc())
}

pub fn user(email: &str) -> UserRecord {
    UserRecord::new(
        email.to_string(),
        "reader".to_string(),
        "hashed:secret".to_string(),
        OffsetDateTime::now_utc(),
    )
}
