//! Redis cache provider.

use async_trait::async_trait;
use bytes::Bytes;
use redis::{AsyncCommands, aio::MultiplexedConnection};

use crate::cache::{CacheError, CacheProvider};

/// Stores every entry with `SET key value EX expires_seconds`.
#[derive(Clone)]
pub struct RedisCacheProvider {
    connection: MultiplexedConnection,
    expires_seconds: u64,
}

impl RedisCacheProvider {
    pub async fn connect(url: &str, expires_seconds: u64) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            connection,
            expires_seconds: expires_seconds.max(1),
        })
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut con = self.connection.clone();
        let value: Option<Vec<u8>> = con.get(key).await.map_err(CacheError::unavailable)?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        let mut con = self.connection.clone();
        con.set_ex::<_, _, ()>(key, value.as_ref(), self.expires_seconds)
            .await
            .map_err(CacheError::unavailable)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut con = self.connection.clone();
        con.del::<_, ()>(key).await.map_err(CacheError::unavailable)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut con = self.connection.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut con)
            .await
            .map(|_| ())
            .map_err(CacheError::unavailable)
    }
}
