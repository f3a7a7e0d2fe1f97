use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::comments::{Comment, CommentId, ComplaintId},
};

use super::{CommentStore, CreateCommentParams, comment_not_found, complaint_not_found};

#[derive(Clone)]
pub struct PgCommentStore {
    pool: PgPool,
}

impl PgCommentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn list_by_complaint(&self, complaint_id: ComplaintId) -> AppResult<Vec<Comment>> {
        let rows = crate::log_query_fetch_all!(
            "comments.list_by_complaint",
            sqlx::query_as::<_, Comment>(
                r#"
                SELECT
                    c.id,
                    c.complaint_id,
                    c.author_id,
                    c.body,
                    c.created_at,
                    c.updated_at
                FROM complaint_comments c
                WHERE c.complaint_id = $1
                ORDER BY c.created_at DESC, c.seq DESC
                "#,
            )
            .bind(complaint_id)
            .fetch_all(&self.pool)
        )?;

        Ok(rows)
    }

    async fn create(&self, params: CreateCommentParams) -> AppResult<Comment> {
        let result = crate::log_query_fetch_one!(
            "comments.create",
            sqlx::query_as::<_, Comment>(
                r#"
                INSERT INTO complaint_comments (id, complaint_id, author_id, body)
                VALUES ($1, $2, $3, $4)
                RETURNING id, complaint_id, author_id, body, created_at, updated_at
                "#,
            )
            .bind(CommentId::generate())
            .bind(params.complaint_id)
            .bind(params.author_id)
            .bind(params.body)
            .fetch_one(&self.pool)
        );

        match result {
            Ok(comment) => Ok(comment),
            Err(sqlx::Error::Database(err)) if err.is_foreign_key_violation() => {
                Err(complaint_not_found())
            }
            Err(err) => Err(AppError::from(err)),
        }
    }

    async fn get_by_id(&self, comment_id: CommentId) -> AppResult<Comment> {
        crate::log_query_fetch_optional!(
            "comments.get_by_id",
            sqlx::query_as::<_, Comment>(
                r#"
                SELECT id, complaint_id, author_id, body, created_at, updated_at
                FROM complaint_comments
                WHERE id = $1
                "#,
            )
            .bind(comment_id)
            .fetch_optional(&self.pool)
        )?
        .ok_or_else(comment_not_found)
    }

    async fn update(&self, comment_id: CommentId, body: String) -> AppResult<Comment> {
        // updated_at must strictly advance on every edit.
        crate::log_query_fetch_optional!(
            "comments.update",
            sqlx::query_as::<_, Comment>(
                r#"
                UPDATE complaint_comments
                SET
                    body = $2,
                    updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
                WHERE id = $1
                RETURNING id, complaint_id, author_id, body, created_at, updated_at
                "#,
            )
            .bind(comment_id)
            .bind(body)
            .fetch_optional(&self.pool)
        )?
        .ok_or_else(comment_not_found)
    }

    async fn delete(&self, comment_id: CommentId) -> AppResult<()> {
        let result = crate::log_query_execute!(
            "comments.delete",
            sqlx::query("DELETE FROM complaint_comments WHERE id = $1")
                .bind(comment_id)
                .execute(&self.pool)
        )?;

        if result.rows_affected() == 0 {
            return Err(comment_not_found());
        }

        Ok(())
    }
}
