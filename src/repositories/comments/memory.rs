use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::{
    error::AppResult,
    models::comments::{Comment, CommentId, ComplaintId},
    repositories::complaints::MemoryComplaintStore,
};

use super::{CommentStore, CreateCommentParams, comment_not_found, complaint_not_found};

#[derive(Debug, Clone)]
struct StoredComment {
    seq: u64,
    comment: Comment,
}

/// Comment store kept in a sharded map. Each id is locked independently, so
/// operations on different comments never wait on each other.
#[derive(Clone)]
pub struct MemoryCommentStore {
    comments: Arc<DashMap<CommentId, StoredComment>>,
    next_seq: Arc<AtomicU64>,
    complaints: MemoryComplaintStore,
}

impl MemoryCommentStore {
    pub fn new(complaints: MemoryComplaintStore) -> Self {
        Self {
            comments: Arc::new(DashMap::new()),
            next_seq: Arc::new(AtomicU64::new(0)),
            complaints,
        }
    }
}

fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn list_by_complaint(&self, complaint_id: ComplaintId) -> AppResult<Vec<Comment>> {
        let mut rows: Vec<StoredComment> = self
            .comments
            .iter()
            .filter(|entry| entry.comment.complaint_id == complaint_id)
            .map(|entry| entry.value().clone())
            .collect();

        rows.sort_by(|a, b| {
            b.comment
                .created_at
                .cmp(&a.comment.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(rows.into_iter().map(|row| row.comment).collect())
    }

    async fn create(&self, params: CreateCommentParams) -> AppResult<Comment> {
        if !self.complaints.contains(params.complaint_id) {
            return Err(complaint_not_found());
        }

        let now = Utc::now();
        let comment = Comment {
            id: CommentId::generate(),
            complaint_id: params.complaint_id,
            author_id: params.author_id,
            body: params.body,
            created_at: now,
            updated_at: now,
        };
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.comments.insert(
            comment.id,
            StoredComment {
                seq,
                comment: comment.clone(),
            },
        );

        Ok(comment)
    }

    async fn get_by_id(&self, comment_id: CommentId) -> AppResult<Comment> {
        self.comments
            .get(&comment_id)
            .map(|entry| entry.comment.clone())
            .ok_or_else(comment_not_found)
    }

    async fn update(&self, comment_id: CommentId, body: String) -> AppResult<Comment> {
        let mut entry = self
            .comments
            .get_mut(&comment_id)
            .ok_or_else(comment_not_found)?;

        entry.comment.body = body;
        entry.comment.updated_at = next_timestamp(entry.comment.updated_at);

        Ok(entry.comment.clone())
    }

    async fn delete(&self, comment_id: CommentId) -> AppResult<()> {
        self.comments
            .remove(&comment_id)
            .map(|_| ())
            .ok_or_else(comment_not_found)
    }
}
