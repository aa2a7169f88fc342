//! Runtime wiring: store, cache provider, codecs, cached repositories and services.

use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use crate::{
    application::{
        auth::{PasswordHasher, TokenAuthority},
        error::AppError,
        posts::PostService,
        repos::{PostsRepo, UsersRepo},
        users::UserService,
    },
    cache::{
        BoundedCacheProvider, CacheAside, CacheBackend, CacheConfig, CacheProvider,
        CachedPostsRepo, CachedUsersRepo, JsonCodec, MemoryCacheProvider,
    },
    config::Settings,
    domain::entities::{PostRecord, UserRecord},
    infra::{db::PostgresRepositories, error::InfraError, redis::RedisCacheProvider},
};

const SOURCE: &str = "context";

/// Build the configured cache provider, bounded by the operation timeout.
pub async fn build_cache_provider(
    config: &CacheConfig,
) -> Result<Arc<dyn CacheProvider>, InfraError> {
    let provider: Arc<dyn CacheProvider> = match config.backend {
        CacheBackend::Redis => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| InfraError::configuration("cache url is not configured"))?;
            let redis = RedisCacheProvider::connect(url, config.expires_seconds())
                .await
                .map_err(|err| InfraError::cache(config.backend.as_str(), err))?;
            Arc::new(redis)
        }
        CacheBackend::Memory => Arc::new(MemoryCacheProvider::new(
            config.memory_capacity,
            config.expires,
        )),
    };

    info!(
        target = SOURCE,
        backend = config.backend.as_str(),
        expires_seconds = config.expires_seconds(),
        "cache provider ready"
    );

    Ok(Arc::new(BoundedCacheProvider::new(
        provider,
        config.operation_timeout,
    )))
}

/// Cache-aside repositories layered over a pair of stores.
#[derive(Clone)]
pub struct CacheLayer {
    provider: Arc<dyn CacheProvider>,
    users: Arc<CachedUsersRepo>,
    posts: Arc<CachedPostsRepo>,
}

impl CacheLayer {
    pub fn new(
        provider: Arc<dyn CacheProvider>,
        config: &CacheConfig,
        users_store: Arc<dyn UsersRepo>,
        posts_store: Arc<dyn PostsRepo>,
    ) -> Self {
        let users_cache = CacheAside::<UserRecord>::new(
            provider.clone(),
            Arc::new(JsonCodec::<UserRecord>::new()),
            "user",
        )
        .with_prefix(config.key_prefix.clone());
        let posts_cache = CacheAside::<PostRecord>::new(
            provider.clone(),
            Arc::new(JsonCodec::<PostRecord>::new()),
            "post",
        )
        .with_prefix(config.key_prefix.clone());

        Self {
            provider,
            users: Arc::new(CachedUsersRepo::new(users_store, users_cache)),
            posts: Arc::new(CachedPostsRepo::new(posts_store, posts_cache)),
        }
    }

    pub fn provider(&self) -> Arc<dyn CacheProvider> {
        self.provider.clone()
    }

    pub fn users(&self) -> Arc<dyn UsersRepo> {
        self.users.clone()
    }

    pub fn posts(&self) -> Arc<dyn PostsRepo> {
        self.posts.clone()
    }
}

/// Health of the two backing services.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub store: bool,
    pub cache: bool,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.store && self.cache
    }
}

pub struct BlogContext {
    repositories: Arc<PostgresRepositories>,
    cache: CacheLayer,
    posts: PostService,
    settings: Settings,
}

impl BlogContext {
    /// Connect to Postgres and the cache, apply migrations when enabled and wire the services.
    pub async fn connect(settings: Settings) -> Result<Self, AppError> {
        let database_url = settings
            .database
            .url
            .as_ref()
            .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

        let pool = PostgresRepositories::connect(
            database_url,
            settings.database.max_connections.get(),
            settings.database.acquire_timeout,
        )
        .await
        .map_err(InfraError::database)?;

        if settings.database.run_migrations {
            PostgresRepositories::run_migrations(&pool)
                .await
                .map_err(InfraError::migration)?;
        }

        let repositories = Arc::new(PostgresRepositories::new(pool));
        let cache_config = CacheConfig::from(&settings.cache);
        let provider = build_cache_provider(&cache_config).await?;
        let cache = CacheLayer::new(
            provider,
            &cache_config,
            repositories.clone(),
            repositories.clone(),
        );
        let posts = PostService::new(cache.posts(), settings.pagination);

        Ok(Self {
            repositories,
            cache,
            posts,
            settings,
        })
    }

    pub fn posts(&self) -> &PostService {
        &self.posts
    }

    pub fn cache(&self) -> &CacheLayer {
        &self.cache
    }

    /// User operations need the host's hashing and token capabilities.
    pub fn users(
        &self,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenAuthority>,
    ) -> UserService {
        UserService::new(self.cache.users(), hasher, tokens, self.token_ttl())
    }

    pub fn token_ttl(&self) -> Duration {
        self.settings.auth.token_expires
    }

    pub async fn check(&self) -> HealthReport {
        let store = match self.repositories.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(target = SOURCE, error = %err, "store health check failed");
                false
            }
        };
        let cache = match self.cache.provider().ping().await {
            Ok(()) => true,
            Err(err) => {
                warn!(target = SOURCE, error = %err, "cache health check failed");
                false
            }
        };

        HealthReport { store, cache }
    }
}
