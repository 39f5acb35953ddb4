//! In-memory `PostingRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{PostingRepository, PostingRepositoryError};
use crate::domain::{JobPosting, PostingId, PostingStatus};

#[derive(Debug, Default)]
struct PostingTable {
    records: HashMap<PostingId, JobPosting>,
    order: Vec<PostingId>,
}

/// Posting store backed by a process-local map; listings keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryPostingRepository {
    table: RwLock<PostingTable>,
}

impl MemoryPostingRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_revision(stored: &JobPosting, expected: u32) -> Result<(), PostingRepositoryError> {
    if stored.revision == expected {
        Ok(())
    } else {
        Err(PostingRepositoryError::revision_mismatch(expected, stored.revision))
    }
}

#[async_trait]
impl PostingRepository for MemoryPostingRepository {
    async fn insert(&self, posting: &JobPosting) -> Result<(), PostingRepositoryError> {
        let mut table = self.table.write().await;
        if table.records.contains_key(&posting.id) {
            return Err(PostingRepositoryError::query(format!(
                "duplicate posting id {}",
                posting.id
            )));
        }
        table.order.push(posting.id);
        table.records.insert(posting.id, posting.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PostingId) -> Result<Option<JobPosting>, PostingRepositoryError> {
        Ok(self.table.read().await.records.get(id).cloned())
    }

    async fn list_by_status(
        &self,
        status: PostingStatus,
    ) -> Result<Vec<JobPosting>, PostingRepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .order
            .iter()
            .filter_map(|id| table.records.get(id))
            .filter(|posting| posting.status == status)
            .cloned()
            .collect())
    }

    async fn save(
        &self,
        posting: &JobPosting,
        expected_revision: u32,
    ) -> Result<(), PostingRepositoryError> {
        let mut table = self.table.write().await;
        let stored = table
            .records
            .get_mut(&posting.id)
            .ok_or_else(|| PostingRepositoryError::missing(posting.id.to_string()))?;
        check_revision(stored, expected_revision)?;
        *stored = posting.clone();
        Ok(())
    }

    async fn delete(
        &self,
        id: &PostingId,
        expected_revision: u32,
    ) -> Result<(), PostingRepositoryError> {
        let mut table = self.table.write().await;
        let stored = table
            .records
            .get(id)
            .ok_or_else(|| PostingRepositoryError::missing(id.to_string()))?;
        check_revision(stored, expected_revision)?;
        table.records.remove(id);
        table.order.retain(|entry| entry != id);
        Ok(())
    }
}
