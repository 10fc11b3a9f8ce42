//! Read-through/write-through cache adapter for song records.
//!
//! Entries are an expendable copy of the authoritative row: a missing entry
//! only means "ask the store", never "the song does not exist".

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::keys::song_key;
use crate::domain::songs::{SongId, SongRecord};

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache read failed: {0}")]
    Read(String),
    #[error("cache write failed: {0}")]
    Write(String),
    #[error("no cache entry for `{key}`")]
    Miss { key: String },
}

impl CacheError {
    pub fn read(err: impl std::fmt::Display) -> Self {
        Self::Read(err.to_string())
    }

    pub fn write(err: impl std::fmt::Display) -> Self {
        Self::Write(err.to_string())
    }
}

/// Raw key/value store with per-entry expiry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// `Ok(None)` for absent or expired keys.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Returns whether an entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

#[derive(Clone)]
pub struct SongCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl SongCache {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn put(&self, song: &SongRecord) -> Result<(), CacheError> {
        let payload = serde_json::to_string(song).map_err(CacheError::write)?;
        let key = song_key(song.id);
        self.backend
            .set(&key, payload, self.ttl)
            .await
            .inspect_err(|err| {
                counter!("songbook_cache_error_total", "op" => "put").increment(1);
                warn!(target = "songbook::cache", key = %key, error = %err, "cache put failed");
            })
    }

    pub async fn get(&self, id: SongId) -> Result<Option<SongRecord>, CacheError> {
        let key = song_key(id);
        let raw = match self.backend.get(&key).await {
            Ok(raw) => raw,
            Err(err) => {
                counter!("songbook_cache_error_total", "op" => "get").increment(1);
                return Err(err);
            }
        };

        let Some(raw) = raw else {
            counter!("songbook_cache_miss_total").increment(1);
            debug!(target = "songbook::cache", key = %key, "cache miss");
            return Ok(None);
        };

        match serde_json::from_str::<SongRecord>(&raw) {
            Ok(song) => {
                counter!("songbook_cache_hit_total").increment(1);
                Ok(Some(song))
            }
            Err(err) => {
                counter!("songbook_cache_error_total", "op" => "decode").increment(1);
                Err(CacheError::read(format!("corrupt entry `{key}`: {err}")))
            }
        }
    }

    /// Remove the entry; `CacheError::Miss` when nothing was cached.
    pub async fn invalidate(&self, id: SongId) -> Result<(), CacheError> {
        let key = song_key(id);
        match self.backend.delete(&key).await {
            Ok(true) => {
                counter!("songbook_cache_evict_total").increment(1);
                Ok(())
            }
            Ok(false) => Err(CacheError::Miss { key }),
            Err(err) => {
                counter!("songbook_cache_error_total", "op" => "invalidate").increment(1);
                Err(err)
            }
        }
    }

    pub async fn ping(&self) -> Result<(), CacheError> {
        self.backend.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryBackend;
    use crate::domain::songs::SongDraft;

    fn cache() -> (SongCache, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new(16));
        (SongCache::new(backend.clone(), DEFAULT_TTL), backend)
    }

    fn song() -> SongRecord {
        SongRecord::new(SongDraft {
            artists: vec!["Ana".into()],
            group: "Trio".into(),
            name: "Verse".into(),
            lyrics: "one\n\ntwo".into(),
            release_date: None,
        })
    }

    #[tokio::test]
    async fn put_then_get_returns_same_record() {
        let (cache, _) = cache();
        let song = song();
        cache.put(&song).await.expect("put");
        assert_eq!(cache.get(song.id).await.expect("get"), Some(song));
    }

    #[tokio::test]
    async fn absent_entry_is_clean_miss() {
        let (cache, _) = cache();
        assert_eq!(cache.get(SongId::generate()).await.expect("get"), None);
    }

    #[tokio::test]
    async fn entries_are_stored_under_song_prefix() {
        let (cache, backend) = cache();
        let song = song();
        cache.put(&song).await.expect("put");
        let raw = backend
            .get(&format!("song:{}", song.id))
            .await
            .expect("backend get");
        assert!(raw.is_some());
    }

    #[tokio::test]
    async fn corrupt_entry_is_read_error() {
        let (cache, backend) = cache();
        let id = SongId::generate();
        backend
            .set(&song_key(id), "{not json".into(), DEFAULT_TTL)
            .await
            .expect("seed");
        assert!(matches!(cache.get(id).await, Err(CacheError::Read(_))));
    }

    #[tokio::test]
    async fn invalidate_reports_miss_when_nothing_cached() {
        let (cache, _) = cache();
        let song = song();
        assert!(matches!(
            cache.invalidate(song.id).await,
            Err(CacheError::Miss { .. })
        ));

        cache.put(&song).await.expect("put");
        cache.invalidate(song.id).await.expect("invalidate");
        assert_eq!(cache.get(song.id).await.expect("get"), None);
    }
}
