use async_trait::async_trait;

use crate::{error::AppResult, models::comments::ComplaintId};

mod memory;
mod postgres;

pub use memory::MemoryComplaintStore;
pub use postgres::PgComplaintStore;

/// Read-only view of the complaint records comments attach to.
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    async fn exists(&self, complaint_id: ComplaintId) -> AppResult<bool>;
}
