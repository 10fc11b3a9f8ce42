//! Postgres-backed repository implementations.

mod songs;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::pagination::PageWindow;
use crate::application::repos::SongFilter;

const SONG_COLUMNS: &str =
    "s.id, s.artists, s.\"group\", s.name, s.lyrics, s.is_deleted, s.release_date, s.created_at";

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(pool).await
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    /// `SELECT ... FROM songs s WHERE <live>`; callers append ` AND ...` clauses.
    fn select_live_songs<'q>() -> QueryBuilder<'q, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(SONG_COLUMNS);
        qb.push(" FROM songs s WHERE ");
        Self::push_live_predicate(&mut qb);
        qb
    }

    /// The one place the soft-delete predicate is written.
    fn push_live_predicate(qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push("s.is_deleted = FALSE");
    }

    fn apply_song_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q SongFilter) {
        if let Some(name) = filter.name.as_ref() {
            qb.push(" AND s.name = ");
            qb.push_bind(name);
        }

        if let Some(group) = filter.group.as_ref() {
            qb.push(" AND s.\"group\" = ");
            qb.push_bind(group);
        }

        if let Some(artist) = filter.artist.as_ref() {
            qb.push(" AND ");
            qb.push_bind(artist);
            qb.push(" = ANY(s.artists)");
        }

        if let Some(release_date) = filter.release_date {
            qb.push(" AND s.release_date = ");
            qb.push_bind(release_date);
        }
    }

    fn apply_window(qb: &mut QueryBuilder<'_, Postgres>, page: PageWindow) {
        qb.push(" LIMIT ");
        qb.push_bind(page.sql_limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.sql_offset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_select_always_carries_soft_delete_predicate() {
        let qb = PostgresRepositories::select_live_songs();
        assert!(qb.sql().contains("WHERE s.is_deleted = FALSE"));
    }

    #[test]
    fn filter_appends_bound_clauses_in_order() {
        let filter = SongFilter {
            name: Some("Uprising".into()),
            artist: Some("Bellamy".into()),
            ..Default::default()
        };
        let mut qb = PostgresRepositories::select_live_songs();
        PostgresRepositories::apply_song_filter(&mut qb, &filter);
        PostgresRepositories::apply_window(&mut qb, PageWindow::default());

        let sql = qb.sql();
        assert!(sql.ends_with(
            "WHERE s.is_deleted = FALSE AND s.name = $1 AND $2 = ANY(s.artists) LIMIT $3 OFFSET $4"
        ));
    }
}
