use crate::domain::models::{FinancialRecord, RecordPatch};
use crate::domain::repository::RecordRepository;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryRecordRepository {
    storage: Arc<RwLock<HashMap<String, FinancialRecord>>>,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryRecordRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    #[instrument(skip(self, record), fields(record_id = %record.id))]
    async fn save(&self, record: FinancialRecord) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.insert(record.id.clone(), record);
        debug!("Record saved to memory storage");
        Ok(())
    }

    /// Records of one owner, oldest first.
    #[instrument(skip(self))]
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<FinancialRecord>> {
        let storage = self.storage.read().await;
        let mut records: Vec<FinancialRecord> = storage
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        trace!(count = records.len(), "Collected owner records");
        Ok(records)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: &RecordPatch) -> Result<Option<FinancialRecord>> {
        let mut storage = self.storage.write().await;
        let Some(record) = storage.get_mut(id) else {
            debug!("No record to update");
            return Ok(None);
        };
        record.apply(patch);
        debug!("Record patched in memory storage");
        Ok(Some(record.clone()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<Option<FinancialRecord>> {
        let mut storage = self.storage.write().await;
        let removed = storage.remove(id);
        debug!(found = removed.is_some(), "Record removed from memory storage");
        Ok(removed)
    }
}
