//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::application::pagination::PageWindow;
use crate::domain::songs::{SongId, SongRecord};

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
    #[error("constraint violated: {message}")]
    Constraint { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            message: message.into(),
        }
    }
}

/// Exact-match filters over song attributes; set fields are AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub name: Option<String>,
    pub group: Option<String>,
    /// Matches songs whose artist list contains this name.
    pub artist: Option<String>,
    pub release_date: Option<OffsetDateTime>,
}

impl SongFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.group.is_none()
            && self.artist.is_none()
            && self.release_date.is_none()
    }

    pub fn matches(&self, song: &SongRecord) -> bool {
        self.name.as_ref().is_none_or(|name| &song.name == name)
            && self.group.as_ref().is_none_or(|group| &song.group == group)
            && self
                .artist
                .as_ref()
                .is_none_or(|artist| song.artists.contains(artist))
            && self
                .release_date
                .is_none_or(|date| song.release_date == date)
    }
}

/// Durable song storage. Every read hides soft-deleted rows.
#[async_trait]
pub trait SongsRepo: Send + Sync {
    async fn create_song(&self, song: &SongRecord) -> Result<(), RepoError>;

    async fn find_by_id(&self, id: SongId) -> Result<Option<SongRecord>, RepoError>;

    async fn list_filtered(
        &self,
        filter: &SongFilter,
        page: PageWindow,
    ) -> Result<Vec<SongRecord>, RepoError>;

    async fn list(&self, page: PageWindow) -> Result<Vec<SongRecord>, RepoError> {
        self.list_filtered(&SongFilter::default(), page).await
    }

    async fn list_by_artist(
        &self,
        artist: &str,
        page: PageWindow,
    ) -> Result<Vec<SongRecord>, RepoError>;

    /// Full replace of a live song. Returns whether a row was touched.
    /// `created_at` is never rewritten.
    async fn update_song(&self, song: &SongRecord) -> Result<bool, RepoError>;

    /// Mark a song deleted regardless of its current state.
    async fn soft_delete(&self, id: SongId) -> Result<(), RepoError>;

    async fn health_check(&self) -> Result<(), RepoError>;
}
