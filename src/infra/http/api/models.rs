use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::songs::SongDraft;

#[derive(Debug, Deserialize, Serialize)]
pub struct SongCreateRequest {
    #[serde(default)]
    pub artists: Vec<String>,
    pub group: String,
    pub name: String,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub release_date: Option<OffsetDateTime>,
}

impl From<SongCreateRequest> for SongDraft {
    fn from(request: SongCreateRequest) -> Self {
        Self {
            artists: request.artists,
            group: request.group,
            name: request.name,
            lyrics: request.lyrics,
            release_date: request.release_date,
        }
    }
}

/// Full replacement body. `id`, `created_at` and `is_deleted` in the body are
/// ignored; an omitted `release_date` keeps the stored one.
pub type SongUpdateRequest = SongCreateRequest;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilteredQuery {
    pub name: Option<String>,
    pub group: Option<String>,
    pub artist: Option<String>,
    /// RFC 3339 timestamp.
    pub release_date: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtistQuery {
    pub artist: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
