//! Postgres-backed repository implementations.

mod posts;
mod users;
mod util;

pub use util::map_sqlx_error;

use std::{sync::Arc, time::Duration};

use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{PostListFilter, RepoError};

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

    /// Open a pool; `acquire_timeout` bounds how long a query waits for a connection.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    /// Appends the live-row and filter conditions; expects a preceding `WHERE`.
    fn apply_post_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: PostListFilter) {
        qb.push(" p.deleted_at IS NULL ");
        if filter.published_only {
            qb.push(" AND p.published_at IS NOT NULL ");
        }
        if let Some(owner) = filter.owner {
            qb.push(" AND p.user_id = ");
            qb.push_bind(owner);
        }
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }

    fn convert_bound(value: u64, name: &str) -> Result<i64, RepoError> {
        value.try_into().map_err(|_| RepoError::InvalidInput {
            message: format!("{name} {value} exceeds supported range"),
        })
    }

    /// An `UPDATE` that matched no live row means the entity is gone.
    fn expect_affected(rows: u64) -> Result<(), RepoError> {
        if rows == 0 {
            Err(RepoError::NotFound)
        } else {
            Ok(())
        }
    }
}
