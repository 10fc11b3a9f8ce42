//! Song records and the lyrics/verse model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::DomainError;

/// Separator between verses inside a lyrics blob.
pub const VERSE_DELIMITER: &str = "\n\n";

const CANONICAL_ID_LEN: usize = 36;

/// Identifier of a song: a UUID rendered in canonical hyphenated form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct SongId(Uuid);

impl SongId {
    /// Time-ordered identifier for a freshly created song.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse the canonical `8-4-4-4-12` hex form. Braced, URN and simple forms are rejected.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        if value.len() != CANONICAL_ID_LEN {
            return Err(DomainError::invalid_identifier(value));
        }
        Uuid::try_parse(value)
            .map(Self)
            .map_err(|_| DomainError::invalid_identifier(value))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for SongId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for SongId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Caller-supplied song content, before an identity is assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongDraft {
    pub artists: Vec<String>,
    pub group: String,
    pub name: String,
    pub lyrics: String,
    pub release_date: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    pub id: SongId,
    pub artists: Vec<String>,
    pub group: String,
    pub name: String,
    pub lyrics: String,
    pub is_deleted: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub release_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl SongRecord {
    /// Assign a fresh identity and creation time to a draft.
    pub fn new(draft: SongDraft) -> Self {
        Self::with_id(SongId::generate(), draft)
    }

    /// Build a record for a known identifier, e.g. the target of a full replace.
    pub fn with_id(id: SongId, draft: SongDraft) -> Self {
        let created_at = truncate_to_micros(OffsetDateTime::now_utc());
        let release_date = draft
            .release_date
            .map(truncate_to_micros)
            .unwrap_or(created_at);

        Self {
            id,
            artists: draft.artists,
            group: draft.group,
            name: draft.name,
            lyrics: draft.lyrics,
            is_deleted: false,
            release_date,
            created_at,
        }
    }

    /// Full replace of the content. Identity and `created_at` are kept, and
    /// so is `release_date` when the draft carries none.
    pub fn revised(self, draft: SongDraft) -> Self {
        Self {
            id: self.id,
            artists: draft.artists,
            group: draft.group,
            name: draft.name,
            lyrics: draft.lyrics,
            is_deleted: false,
            release_date: draft
                .release_date
                .map(truncate_to_micros)
                .unwrap_or(self.release_date),
            created_at: self.created_at,
        }
    }

    /// Required text attributes must carry non-whitespace content.
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("group", &self.group)?;
        require_text("name", &self.name)
    }

    pub fn verses(&self) -> Vec<&str> {
        split_verses(&self.lyrics)
    }
}

impl SongDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("group", &self.group)?;
        require_text("name", &self.name)
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::empty_field(field));
    }
    Ok(())
}

/// Split lyrics into verses on blank-line boundaries. Empty lyrics have no verses.
pub fn split_verses(lyrics: &str) -> Vec<&str> {
    if lyrics.is_empty() {
        return Vec::new();
    }
    lyrics.split(VERSE_DELIMITER).collect()
}

/// Return verses `[offset, min(offset + limit, len))`; an offset past the end yields nothing.
pub fn paginate_verses(lyrics: &str, offset: usize, limit: usize) -> Vec<String> {
    let verses = split_verses(lyrics);
    if offset >= verses.len() {
        return Vec::new();
    }
    let end = offset.saturating_add(limit).min(verses.len());
    verses[offset..end]
        .iter()
        .map(|verse| (*verse).to_string())
        .collect()
}

// Postgres keeps microseconds; trimming here keeps records equal across a store round trip.
fn truncate_to_micros(value: OffsetDateTime) -> OffsetDateTime {
    value.replace_microsecond(value.microsecond()).unwrap_or(value)
}
