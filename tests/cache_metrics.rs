use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;
use songbook::application::cache::{CacheBackend, CacheError, DEFAULT_TTL, SongCache};
use songbook::cache::MemoryBackend;
use songbook::domain::songs::{SongDraft, SongRecord};

struct BrokenBackend;

#[async_trait]
impl CacheBackend for BrokenBackend {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::read("connection refused"))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::write("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        Err(CacheError::write("connection refused"))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::read("connection refused"))
    }
}

fn song() -> SongRecord {
    SongRecord::new(SongDraft {
        group: "Muse".into(),
        name: "Uprising".into(),
        ..Default::default()
    })
}

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let cache = SongCache::new(Arc::new(MemoryBackend::new(8)), DEFAULT_TTL);
    let record = song();

    assert_eq!(cache.get(record.id).await.expect("miss"), None);
    cache.put(&record).await.expect("put");
    assert_eq!(cache.get(record.id).await.expect("hit"), Some(record.clone()));
    cache.invalidate(record.id).await.expect("invalidate");

    let broken = SongCache::new(Arc::new(BrokenBackend), DEFAULT_TTL);
    assert!(broken.put(&record).await.is_err());
    assert!(broken.get(record.id).await.is_err());

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for expected in [
        "songbook_cache_hit_total",
        "songbook_cache_miss_total",
        "songbook_cache_evict_total",
        "songbook_cache_error_total",
    ] {
        assert!(names.contains(expected), "missing metric {expected}");
    }
}
