//! Redis cache backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use crate::application::cache::{CacheBackend, CacheError};

#[derive(Clone)]
pub struct RedisBackend {
    connection: MultiplexedConnection,
}

impl RedisBackend {
    /// Open a multiplexed connection and verify it answers `PING`.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(CacheError::read)?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(CacheError::read)?;
        let backend = Self { connection };
        backend.ping().await?;
        Ok(backend)
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(CacheError::read)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let seconds = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(key, value, seconds)
            .await
            .map_err(CacheError::write)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection.clone();
        let removed: i64 = conn.del(key).await.map_err(CacheError::write)?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(CacheError::read)?;
        Ok(())
    }
}
