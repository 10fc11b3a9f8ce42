//! Cache backends for song records.
//!
//! - **Memory**: bounded in-process LRU with per-entry expiry
//! - **Redis**: shared cache via a multiplexed async connection
//!
//! The backend is chosen by `[cache]` in `songbook.toml`:
//!
//! ```toml
//! [cache]
//! redis_url = "redis://127.0.0.1:6379"   # omit for the in-process LRU
//! ttl_seconds = 3600
//! memory_capacity = 1024
//! ```

mod config;
pub mod keys;
mod memory;
mod redis;

pub use config::CacheConfig;
pub use memory::MemoryBackend;
pub use self::redis::RedisBackend;

use std::sync::Arc;

use tracing::info;

use crate::application::cache::{CacheBackend, CacheError, SongCache};

/// Connect the configured backend and wrap it in a [`SongCache`].
pub async fn build_song_cache(config: &CacheConfig) -> Result<SongCache, CacheError> {
    let backend: Arc<dyn CacheBackend> = match config.redis_url.as_deref() {
        Some(url) => {
            let backend = RedisBackend::connect(url).await?;
            info!(target = "songbook::cache", backend = "redis", "cache backend ready");
            Arc::new(backend)
        }
        None => {
            info!(
                target = "songbook::cache",
                backend = "memory",
                capacity = config.memory_capacity,
                "cache backend ready"
            );
            Arc::new(MemoryBackend::from_config(config))
        }
    };
    Ok(SongCache::new(backend, config.ttl()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_redis_url_selects_memory_backend() {
        let config = CacheConfig {
            ttl_seconds: 60,
            ..Default::default()
        };
        let cache = build_song_cache(&config).await.expect("memory cache");
        assert_eq!(cache.ttl(), std::time::Duration::from_secs(60));
        cache.ping().await.expect("ping");
    }

    #[tokio::test]
    async fn malformed_redis_url_is_rejected() {
        let config = CacheConfig {
            redis_url: Some("not a url".into()),
            ..Default::default()
        };
        assert!(build_song_cache(&config).await.is_err());
    }
}
