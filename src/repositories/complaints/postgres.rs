use async_trait::async_trait;
use sqlx::PgPool;

use crate::{error::AppResult, models::comments::ComplaintId};

use super::ComplaintStore;

#[derive(Clone)]
pub struct PgComplaintStore {
    pool: PgPool,
}

impl PgComplaintStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ComplaintStore for PgComplaintStore {
    async fn exists(&self, complaint_id: ComplaintId) -> AppResult<bool> {
        let exists = crate::log_query_fetch_one!(
            "complaints.exists",
            sqlx::query_scalar::<_, bool>(
                r#"
                SELECT EXISTS (
                    SELECT 1
                    FROM complaints
                    WHERE id = $1
                )
                "#,
            )
            .bind(complaint_id)
            .fetch_one(&self.pool)
        )?;

        Ok(exists)
    }
}
