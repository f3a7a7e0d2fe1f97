use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashSet;

use crate::{error::AppResult, models::comments::ComplaintId};

use super::ComplaintStore;

/// In-memory complaint registry. Clones share the same set.
#[derive(Clone, Default)]
pub struct MemoryComplaintStore {
    ids: Arc<DashSet<ComplaintId>>,
}

impl MemoryComplaintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(ids: impl IntoIterator<Item = ComplaintId>) -> Self {
        let store = Self::new();
        for id in ids {
            store.insert(id);
        }
        store
    }

    pub fn insert(&self, complaint_id: ComplaintId) {
        self.ids.insert(complaint_id);
    }

    pub fn contains(&self, complaint_id: ComplaintId) -> bool {
        self.ids.contains(&complaint_id)
    }
}

#[async_trait]
impl ComplaintStore for MemoryComplaintStore {
    async fn exists(&self, complaint_id: ComplaintId) -> AppResult<bool> {
        Ok(self.contains(complaint_id))
    }
}
