use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::{
    application::pagination::PageWindow,
    application::repos::{RepoError, SongFilter, SongsRepo},
    domain::songs::{SongId, SongRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct SongRow {
    id: Uuid,
    artists: Vec<String>,
    group: String,
    name: String,
    lyrics: String,
    is_deleted: bool,
    release_date: OffsetDateTime,
    created_at: OffsetDateTime,
}

impl From<SongRow> for SongRecord {
    fn from(row: SongRow) -> Self {
        Self {
            id: SongId::from(row.id),
            artists: row.artists,
            group: row.group,
            name: row.name,
            lyrics: row.lyrics,
            is_deleted: row.is_deleted,
            release_date: row.release_date,
            created_at: row.created_at,
        }
    }
}

impl PostgresRepositories {
    async fn fetch_songs(
        &self,
        mut qb: QueryBuilder<'_, Postgres>,
    ) -> Result<Vec<SongRecord>, RepoError> {
        let rows = qb
            .build_query_as::<SongRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(SongRecord::from).collect())
    }
}

#[async_trait]
impl SongsRepo for PostgresRepositories {
    async fn create_song(&self, song: &SongRecord) -> Result<(), RepoError> {
        song.validate()
            .map_err(|err| RepoError::constraint(err.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO songs (id, artists, "group", name, lyrics, is_deleted, release_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(song.id.as_uuid())
        .bind(&song.artists)
        .bind(&song.group)
        .bind(&song.name)
        .bind(&song.lyrics)
        .bind(song.is_deleted)
        .bind(song.release_date)
        .bind(song.created_at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: SongId) -> Result<Option<SongRecord>, RepoError> {
        let mut qb = Self::select_live_songs();
        qb.push(" AND s.id = ");
        qb.push_bind(id.as_uuid());

        let row = qb
            .build_query_as::<SongRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(SongRecord::from))
    }

    async fn list_filtered(
        &self,
        filter: &SongFilter,
        page: PageWindow,
    ) -> Result<Vec<SongRecord>, RepoError> {
        let mut qb = Self::select_live_songs();
        Self::apply_song_filter(&mut qb, filter);
        Self::apply_window(&mut qb, page);
        self.fetch_songs(qb).await
    }

    async fn list_by_artist(
        &self,
        artist: &str,
        page: PageWindow,
    ) -> Result<Vec<SongRecord>, RepoError> {
        let filter = SongFilter {
            artist: Some(artist.to_string()),
            ..Default::default()
        };
        self.list_filtered(&filter, page).await
    }

    async fn update_song(&self, song: &SongRecord) -> Result<bool, RepoError> {
        song.validate()
            .map_err(|err| RepoError::constraint(err.to_string()))?;

        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE songs s SET artists = ");
        qb.push_bind(&song.artists);
        qb.push(", \"group\" = ");
        qb.push_bind(&song.group);
        qb.push(", name = ");
        qb.push_bind(&song.name);
        qb.push(", lyrics = ");
        qb.push_bind(&song.lyrics);
        qb.push(", release_date = ");
        qb.push_bind(song.release_date);
        qb.push(" WHERE s.id = ");
        qb.push_bind(song.id.as_uuid());
        qb.push(" AND ");
        Self::push_live_predicate(&mut qb);

        let result = qb
            .build()
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            debug!(
                target = "songbook::db::songs",
                song_id = %song.id,
                "update matched no live row"
            );
        }
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: SongId) -> Result<(), RepoError> {
        sqlx::query("UPDATE songs SET is_deleted = TRUE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.ping().await.map_err(map_sqlx_error)
    }
}
