use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{PostListFilter, PostsRepo, RepoError};
use crate::domain::entities::PostRecord;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

const POST_COLUMNS: &str = "p.id, p.user_id, p.title, p.slug, p.content, p.published_at, \
     p.created_at, p.updated_at, p.deleted_at";

#[derive(sqlx::FromRow)]
pub(crate) struct PostRow {
    pub(crate) id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) published_at: Option<OffsetDateTime>,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
    pub(crate) deleted_at: Option<OffsetDateTime>,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn find(&self, id: Uuid) -> Result<PostRecord, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1 AND p.deleted_at IS NULL");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<PostRecord, RepoError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p \
             WHERE p.id = $1 AND p.user_id = $2 AND p.deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn list_posts(
        &self,
        filter: PostListFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let offset = Self::convert_bound(offset, "offset")?;
        let limit = Self::convert_bound(limit, "limit")?;

        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(" FROM posts p WHERE ");
        Self::apply_post_filter(&mut qb, filter);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_posts(&self, filter: PostListFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM posts p WHERE ");
        Self::apply_post_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn create(&self, post: &PostRecord) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO posts \
             (id, user_id, title, slug, content, published_at, created_at, updated_at, deleted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(post.id)
        .bind(post.user_id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(post.published_at)
        .bind(post.created_at)
        .bind(post.updated_at)
        .bind(post.deleted_at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, post: &PostRecord) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE posts SET title = $1, slug = $2, content = $3, updated_at = $4, published_at = $5 \
             WHERE id = $6 AND deleted_at IS NULL",
        )
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(post.updated_at)
        .bind(post.published_at)
        .bind(post.id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Self::expect_affected(result.rows_affected())
    }

    async fn publish(&self, post: &PostRecord) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE posts SET published_at = $1, updated_at = $2 \
             WHERE id = $3 AND deleted_at IS NULL",
        )
        .bind(post.published_at)
        .bind(post.updated_at)
        .bind(post.id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Self::expect_affected(result.rows_affected())
    }

    async fn soft_delete(&self, post: &PostRecord) -> Result<(), RepoError> {
        let deleted_at = post.deleted_at.unwrap_or(post.updated_at);
        let result = sqlx::query(
            "UPDATE posts SET updated_at = $1, deleted_at = $2 \
             WHERE id = $3 AND deleted_at IS NULL",
        )
        .bind(post.updated_at)
        .bind(deleted_at)
        .bind(post.id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Self::expect_affected(result.rows_affected())
    }
}
