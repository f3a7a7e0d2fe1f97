use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::jwt::JwtConfig,
    models::comments::ComplaintId,
    repositories::{
        comments::{MemoryCommentStore, PgCommentStore},
        complaints::{MemoryComplaintStore, PgComplaintStore},
    },
    usecases::comments::CommentService,
};

#[derive(Clone)]
pub struct AppState {
    pub comments: CommentService,
    pub jwt_config: JwtConfig,
}

impl AppState {
    pub fn with_postgres(db: PgPool, jwt_config: JwtConfig) -> Self {
        let comments = CommentService::new(
            Arc::new(PgCommentStore::new(db.clone())),
            Arc::new(PgComplaintStore::new(db)),
        );

        Self {
            comments,
            jwt_config,
        }
    }

    pub fn in_memory(complaint_ids: Vec<ComplaintId>, jwt_config: JwtConfig) -> Self {
        let complaints = MemoryComplaintStore::with_ids(complaint_ids);
        let comments = CommentService::new(
            Arc::new(MemoryCommentStore::new(complaints.clone())),
            Arc::new(complaints),
        );

        Self {
            comments,
            jwt_config,
        }
    }
}
