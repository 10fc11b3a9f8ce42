use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::application::pagination::PageWindow;
use crate::application::repos::SongFilter;
use crate::application::songs::SongError;
use crate::domain::songs::SongRecord;

use super::error::ApiError;
use super::models::*;
use super::state::ApiState;

pub async fn create_song(
    State(state): State<ApiState>,
    payload: Result<Json<SongCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let ctx = state.call_context();

    let song = state
        .songs
        .create(&ctx, SongRecord::new(payload.into()))
        .await?;

    Ok((StatusCode::CREATED, Json(song)))
}

pub async fn list_songs(
    State(state): State<ApiState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let ctx = state.call_context();

    let songs = state
        .songs
        .list(&ctx, PageWindow::from_raw(query.limit, query.offset))
        .await?;

    Ok(Json(songs))
}

pub async fn list_filtered_songs(
    State(state): State<ApiState>,
    query: Result<Query<FilteredQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;

    let release_date = query
        .release_date
        .as_deref()
        .map(|raw| OffsetDateTime::parse(raw, &Rfc3339))
        .transpose()
        .map_err(|err| {
            ApiError::from(SongError::invalid_argument(format!(
                "release_date must be an RFC 3339 timestamp: {err}"
            )))
        })?;

    let filter = SongFilter {
        name: query.name,
        group: query.group,
        artist: query.artist,
        release_date,
    };
    let ctx = state.call_context();

    let songs = state
        .songs
        .list_filtered(
            &ctx,
            &filter,
            PageWindow::from_raw(query.limit, query.offset),
        )
        .await?;

    Ok(Json(songs))
}

pub async fn list_songs_by_artist(
    State(state): State<ApiState>,
    query: Result<Query<ArtistQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let artist = query.artist.unwrap_or_default();
    let ctx = state.call_context();

    let songs = state
        .songs
        .list_by_artist(
            &ctx,
            &artist,
            PageWindow::from_raw(query.limit, query.offset),
        )
        .await?;

    Ok(Json(songs))
}

pub async fn get_song(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = state.call_context();
    let song = state.songs.get_by_id(&ctx, &id).await?;
    Ok(Json(song))
}

pub async fn get_song_lyrics(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let ctx = state.call_context();

    let verses = state
        .songs
        .paginate_lyrics(&ctx, &id, PageWindow::from_raw(query.limit, query.offset))
        .await?;

    Ok(Json(verses))
}

pub async fn update_song(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<SongUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let ctx = state.call_context();

    let song = state.songs.update(&ctx, &id, payload.into()).await?;
    Ok(Json(song))
}

pub async fn delete_song(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = state.call_context();
    state.songs.delete(&ctx, &id).await?;
    Ok(Json(MessageResponse {
        message: "song deleted",
    }))
}
