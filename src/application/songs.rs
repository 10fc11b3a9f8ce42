//! Song service: the single read/write contract over the store and its cache.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::application::cache::{CacheError, SongCache};
use crate::application::context::{CallContext, Interrupted};
use crate::application::pagination::PageWindow;
use crate::application::repos::{RepoError, SongFilter, SongsRepo};
use crate::domain::error::DomainError;
use crate::domain::songs::{SongDraft, SongId, SongRecord, paginate_verses};

#[derive(Debug, Error)]
pub enum SongError {
    #[error("`{value}` is not a valid song identifier")]
    InvalidIdentifier { value: String },
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
    #[error("song not found")]
    NotFound,
    #[error("constraint violated: {message}")]
    Constraint { message: String },
    #[error("song identifier already exists ({constraint})")]
    DuplicateId { constraint: String },
    #[error("cache read failed: {0}")]
    CacheRead(String),
    #[error("cache write failed: {0}")]
    CacheWrite(String),
    #[error("no cache entry for `{key}`")]
    CacheMiss { key: String },
    #[error(transparent)]
    Canceled(#[from] Interrupted),
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl SongError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

impl From<DomainError> for SongError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidIdentifier { value } => Self::InvalidIdentifier { value },
            err @ DomainError::EmptyField { .. } => Self::Constraint {
                message: err.to_string(),
            },
        }
    }
}

impl From<RepoError> for SongError {
    fn from(error: RepoError) -> Self {
        match error {
            RepoError::NotFound => Self::NotFound,
            RepoError::Duplicate { constraint } => Self::DuplicateId { constraint },
            RepoError::Constraint { message } => Self::Constraint { message },
            RepoError::InvalidInput { message } => Self::InvalidArgument { message },
            RepoError::Timeout => Self::Canceled(Interrupted::DeadlineExceeded),
            err @ RepoError::Persistence(_) => Self::Persistence(err.to_string()),
        }
    }
}

impl From<CacheError> for SongError {
    fn from(error: CacheError) -> Self {
        match error {
            CacheError::Read(message) => Self::CacheRead(message),
            CacheError::Write(message) => Self::CacheWrite(message),
            CacheError::Miss { key } => Self::CacheMiss { key },
        }
    }
}

enum CacheLookup {
    Hit(SongRecord),
    Tombstone,
    Absent,
}

#[derive(Clone)]
pub struct SongService {
    store: Arc<dyn SongsRepo>,
    cache: SongCache,
}

impl SongService {
    pub fn new(store: Arc<dyn SongsRepo>, cache: SongCache) -> Self {
        Self { store, cache }
    }

    /// Cache first, then store. A failed cache write leaves the store untouched.
    #[instrument(skip_all, fields(song_id = %song.id))]
    pub async fn create(&self, ctx: &CallContext, song: SongRecord) -> Result<SongRecord, SongError> {
        song.validate()?;
        if song.is_deleted {
            return Err(SongError::invalid_argument("a new song cannot be deleted"));
        }

        ctx.run(self.cache.put(&song)).await??;

        match ctx.run(self.store.create_song(&song)).await? {
            Ok(()) => {
                info!(target = "songbook::songs", name = %song.name, "song created");
                Ok(song)
            }
            Err(err) => {
                self.evict_after_rejected_write(song.id).await;
                Err(err.into())
            }
        }
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_by_id(&self, ctx: &CallContext, raw_id: &str) -> Result<SongRecord, SongError> {
        let id = SongId::parse(raw_id)?;

        match self.lookup_cached(ctx, id).await? {
            CacheLookup::Hit(song) => return Ok(song),
            CacheLookup::Tombstone => return Err(SongError::NotFound),
            CacheLookup::Absent => {}
        }

        let song = ctx
            .run(self.store.find_by_id(id))
            .await??
            .ok_or(SongError::NotFound)?;

        if let Err(err) = ctx.run(self.cache.put(&song)).await? {
            warn!(target = "songbook::songs", error = %err, "cache fill failed");
        }

        Ok(song)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(&self, ctx: &CallContext, page: PageWindow) -> Result<Vec<SongRecord>, SongError> {
        Ok(ctx.run(self.store.list(page)).await??)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_filtered(
        &self,
        ctx: &CallContext,
        filter: &SongFilter,
        page: PageWindow,
    ) -> Result<Vec<SongRecord>, SongError> {
        for (field, value) in [
            ("name", filter.name.as_deref()),
            ("group", filter.group.as_deref()),
            ("artist", filter.artist.as_deref()),
        ] {
            if value.is_some_and(|value| value.trim().is_empty()) {
                return Err(SongError::invalid_argument(format!(
                    "filter `{field}` must not be empty"
                )));
            }
        }

        Ok(ctx.run(self.store.list_filtered(filter, page)).await??)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_by_artist(
        &self,
        ctx: &CallContext,
        artist: &str,
        page: PageWindow,
    ) -> Result<Vec<SongRecord>, SongError> {
        if artist.trim().is_empty() {
            return Err(SongError::invalid_argument("artist name is required"));
        }

        Ok(ctx.run(self.store.list_by_artist(artist, page)).await??)
    }

    /// Full replace of a live song's content; identity and `created_at` are
    /// kept. Targeting a missing or deleted song is a silent no-op.
    #[instrument(skip(self, ctx, draft))]
    pub async fn update(
        &self,
        ctx: &CallContext,
        raw_id: &str,
        draft: SongDraft,
    ) -> Result<SongRecord, SongError> {
        let id = SongId::parse(raw_id)?;
        draft.validate()?;

        let current = match self.lookup_cached(ctx, id).await? {
            CacheLookup::Hit(song) => Some(song),
            CacheLookup::Tombstone => None,
            CacheLookup::Absent => ctx.run(self.store.find_by_id(id)).await??,
        };
        let Some(current) = current else {
            debug!(target = "songbook::songs", "update matched no live song");
            return Ok(SongRecord::with_id(id, draft));
        };
        let song = current.revised(draft);

        ctx.run(self.cache.put(&song)).await??;

        match ctx.run(self.store.update_song(&song)).await? {
            Ok(true) => {
                info!(target = "songbook::songs", "song updated");
                Ok(song)
            }
            Ok(false) => {
                debug!(target = "songbook::songs", "update matched no live song");
                self.evict_after_rejected_write(song.id).await;
                Ok(song)
            }
            Err(err) => {
                self.evict_after_rejected_write(song.id).await;
                Err(err.into())
            }
        }
    }

    /// Invalidate the cached copy, then soft-delete. An uncached song is not an error.
    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &CallContext, raw_id: &str) -> Result<(), SongError> {
        let id = SongId::parse(raw_id)?;

        match ctx.run(self.cache.invalidate(id)).await? {
            Ok(()) => {}
            Err(CacheError::Miss { key }) => {
                debug!(target = "songbook::songs", key = %key, "song was not cached");
            }
            Err(err) => return Err(err.into()),
        }

        ctx.run(self.store.soft_delete(id)).await??;
        info!(target = "songbook::songs", "song deleted");
        Ok(())
    }

    /// Verses `[offset, offset + limit)` of a live song's lyrics.
    #[instrument(skip(self, ctx))]
    pub async fn paginate_lyrics(
        &self,
        ctx: &CallContext,
        raw_id: &str,
        page: PageWindow,
    ) -> Result<Vec<String>, SongError> {
        let song = self.get_by_id(ctx, raw_id).await?;
        Ok(paginate_verses(
            &song.lyrics,
            page.offset() as usize,
            page.limit() as usize,
        ))
    }

    pub async fn health_check(&self) -> Result<(), SongError> {
        self.store.health_check().await?;
        self.cache.ping().await?;
        Ok(())
    }

    async fn lookup_cached(&self, ctx: &CallContext, id: SongId) -> Result<CacheLookup, Interrupted> {
        match ctx.run(self.cache.get(id)).await? {
            Ok(Some(song)) if song.is_deleted => Ok(CacheLookup::Tombstone),
            Ok(Some(song)) => Ok(CacheLookup::Hit(song)),
            Ok(None) => Ok(CacheLookup::Absent),
            Err(err) => {
                warn!(target = "songbook::songs", error = %err, "cache read failed, using store");
                Ok(CacheLookup::Absent)
            }
        }
    }

    // A cached entry must not outlive a write the store refused.
    async fn evict_after_rejected_write(&self, id: SongId) {
        match self.cache.invalidate(id).await {
            Ok(()) | Err(CacheError::Miss { .. }) => {}
            Err(err) => {
                warn!(
                    target = "songbook::songs",
                    song_id = %id,
                    error = %err,
                    "failed to evict cache entry after rejected write"
                );
            }
        }
    }
}
