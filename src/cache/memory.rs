//! In-process cache backend: bounded LRU with per-entry expiry.

use std::sync::{RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tracing::warn;

use crate::application::cache::{CacheBackend, CacheError};

use super::config::CacheConfig;

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

pub struct MemoryBackend {
    entries: RwLock<LruCache<String, Entry>>,
}

impl MemoryBackend {
    pub fn new(capacity: usize) -> Self {
        Self::from_config(&CacheConfig {
            memory_capacity: capacity,
            ..Default::default()
        })
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.memory_capacity_non_zero())),
        }
    }

    pub fn len(&self) -> usize {
        self.lock("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self, op: &'static str) -> RwLockWriteGuard<'_, LruCache<String, Entry>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!(
                target = "songbook::cache::memory",
                op,
                result = "poisoned_recovered",
                "Recovered from poisoned cache lock"
            );
            poisoned.into_inner()
        })
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let mut entries = self.lock("get");
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now() + ttl;
        self.lock("set")
            .put(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let now = Instant::now();
        let removed = self.lock("delete").pop(key);
        Ok(removed.is_some_and(|entry| entry.is_live(now)))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn set_then_get() {
        let backend = MemoryBackend::new(4);
        backend.set("song:a", "payload".into(), HOUR).await.unwrap();
        assert_eq!(backend.get("song:a").await.unwrap().as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn set_overwrites_existing_entry() {
        let backend = MemoryBackend::new(4);
        backend.set("song:a", "old".into(), HOUR).await.unwrap();
        backend.set("song:a", "new".into(), HOUR).await.unwrap();
        assert_eq!(backend.get("song:a").await.unwrap().as_deref(), Some("new"));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let backend = MemoryBackend::new(4);
        backend.set("song:a", "payload".into(), Duration::ZERO).await.unwrap();
        assert_eq!(backend.get("song:a").await.unwrap(), None);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_live_entry_existed() {
        let backend = MemoryBackend::new(4);
        assert!(!backend.delete("song:a").await.unwrap());

        backend.set("song:a", "payload".into(), HOUR).await.unwrap();
        assert!(backend.delete("song:a").await.unwrap());
        assert!(!backend.delete("song:a").await.unwrap());

        backend.set("song:b", "payload".into(), Duration::ZERO).await.unwrap();
        assert!(!backend.delete("song:b").await.unwrap());
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let backend = MemoryBackend::new(2);
        backend.set("song:a", "a".into(), HOUR).await.unwrap();
        backend.set("song:b", "b".into(), HOUR).await.unwrap();
        let _ = backend.get("song:a").await.unwrap();
        backend.set("song:c", "c".into(), HOUR).await.unwrap();

        assert!(backend.get("song:a").await.unwrap().is_some());
        assert!(backend.get("song:b").await.unwrap().is_none());
        assert!(backend.get("song:c").await.unwrap().is_some());
    }
}
