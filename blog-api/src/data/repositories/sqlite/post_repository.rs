use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::data::post_repository::{NewPost, PostPatch, PostQuery, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Author, Post, PostId};

const SELECT_POSTS: &str = r#"
    SELECT
        p.id,
        p.title,
        p.content,
        p.category,
        p.author_id,
        u.username AS author_username,
        p.created_at,
        p.updated_at
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

#[derive(Debug, Clone)]
pub(crate) struct SqlitePostRepository {
    pool: SqlitePool,
}

impl SqlitePostRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!("{SELECT_POSTS} WHERE p.id = ?");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }
}

#[derive(FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    category: Option<String>,
    author_id: i64,
    author_username: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, content, category, author_id)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.category)
        .bind(input.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        self.fetch_by_id(id)
            .await?
            .ok_or_else(|| DomainError::Storage(format!("inserted post {id} is not readable")))
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, DomainError> {
        self.fetch_by_id(id.get()).await
    }

    async fn update_post_owned(
        &self,
        id: PostId,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = ?,
                content = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ? AND author_id = ?
            "#,
        )
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(id.get())
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_by_id(id.get()).await
    }

    async fn delete_post_owned(&self, id: PostId, owner_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = ? AND author_id = ?
            "#,
        )
        .bind(id.get())
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self, query: PostQuery) -> Result<Vec<Post>, DomainError> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_POSTS);
        if let Some(category) = query.category {
            builder.push(" WHERE p.category = ").push_bind(category);
        }
        builder
            .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(i64::from(query.pagination.limit))
            .push(" OFFSET ")
            .push_bind(query.pagination.offset());

        let rows = builder
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let author = Author {
        id: row.author_id,
        username: row.author_username,
    };
    Post::new(
        row.id,
        row.title,
        row.content,
        author,
        row.category,
        row.created_at,
        row.updated_at,
    )
    .map_err(|err| DomainError::Storage(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_foreign_key_violation()
    {
        return DomainError::Validation {
            field: "author",
            message: "must reference an existing user",
        };
    }
    DomainError::Storage(err.to_string())
}
