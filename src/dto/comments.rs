use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::comments::{Comment, CommentId, ComplaintId, UserId};

pub const COMMENT_CREATED_MESSAGE: &str = "Comment posted successfully!";
pub const COMMENT_UPDATED_MESSAGE: &str = "Comment updated successfully!";
pub const COMMENT_DELETED_MESSAGE: &str = "Comment deleted successfully!";

/// Raw create payload. Fields stay loosely typed so that missing or mistyped
/// values surface as field validation errors.
#[derive(Debug, Default, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub complaint_id: Option<Value>,
    #[serde(default)]
    pub body: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    pub body: Option<Value>,
}

#[cfg(test)]
impl CreateCommentRequest {
    pub fn new(complaint_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            complaint_id: Some(Value::String(complaint_id.into())),
            body: Some(Value::String(body.into())),
        }
    }
}

#[cfg(test)]
impl UpdateCommentRequest {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(Value::String(body.into())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: CommentId,
    pub complaint_id: ComplaintId,
    pub author_id: UserId,
    pub body: String,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            is_edited: comment.updated_at > comment.created_at,
            id: comment.id,
            complaint_id: comment.complaint_id,
            author_id: comment.author_id,
            body: comment.body,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}
