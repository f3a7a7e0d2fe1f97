use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::comments::{Comment, CommentId, ComplaintId, UserId},
};

mod memory;
mod postgres;

pub use memory::MemoryCommentStore;
pub use postgres::PgCommentStore;

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub complaint_id: ComplaintId,
    pub author_id: UserId,
    pub body: String,
}

/// Durable comment storage. Performs no authorization of its own.
///
/// Operations on one comment id are applied atomically, so a fetch followed by
/// a mutation observes either the record or its absence, never a partial state.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// All comments of a complaint, newest first. Comments created at the same
    /// instant come back in reverse insertion order.
    async fn list_by_complaint(&self, complaint_id: ComplaintId) -> AppResult<Vec<Comment>>;

    /// Fails with `NotFound` when the complaint does not exist.
    async fn create(&self, params: CreateCommentParams) -> AppResult<Comment>;

    async fn get_by_id(&self, comment_id: CommentId) -> AppResult<Comment>;

    /// Overwrites the body and refreshes `updated_at`.
    async fn update(&self, comment_id: CommentId, body: String) -> AppResult<Comment>;

    /// Fails with `NotFound` when the comment is already gone.
    async fn delete(&self, comment_id: CommentId) -> AppResult<()>;
}

pub(crate) fn comment_not_found() -> crate::error::AppError {
    crate::error::AppError::NotFound("Comment not found".to_string())
}

pub(crate) fn complaint_not_found() -> crate::error::AppError {
    crate::error::AppError::NotFound("Complaint not found".to_string())
}
