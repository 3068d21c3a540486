use crate::domain::error::DomainError;
use crate::domain::models::{FinancialRecord, NewRecord, RecordPatch};
use crate::domain::repository::RecordRepository;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub struct RecordService<R: RecordRepository> {
    repository: Arc<R>,
}

impl<R: RecordRepository> RecordService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, req), fields(owner_id = %req.owner_id))]
    pub async fn create(&self, req: NewRecord) -> Result<FinancialRecord> {
        if req.owner_id.trim().is_empty() {
            warn!("Record submitted without an owner");
            return Err(DomainError::Validation("userId is required".to_string()).into());
        }
        let record = FinancialRecord::from_draft(Uuid::new_v4().to_string(), req.owner_id, req.draft);
        self.repository.save(record.clone()).await?;
        info!(record_id = %record.id, "Record created");
        Ok(record)
    }

    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FinancialRecord>> {
        self.repository.find_by_owner(owner_id).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: RecordPatch) -> Result<FinancialRecord> {
        let record = self
            .repository
            .update(id, &patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Record not found: {id}")))?;
        info!(record_id = %record.id, "Record updated");
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<FinancialRecord> {
        let removed = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Record not found: {id}")))?;
        info!(record_id = %removed.id, "Record deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryRecordRepository;
    use crate::domain::models::{Amount, Category, PaymentMethod, RecordDraft};
    use chrono::Utc;

    fn service() -> RecordService<InMemoryRecordRepository> {
        RecordService::new(Arc::new(InMemoryRecordRepository::new()))
    }

    fn new_record(owner: &str, cents: i64) -> NewRecord {
        NewRecord {
            owner_id: owner.to_string(),
            draft: RecordDraft {
                date: Utc::now(),
                description: "lunch".to_string(),
                amount: Amount::from_cents(cents),
                category: Category::FoodAndDining,
                payment_method: PaymentMethod::Cash,
            },
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_keeps_owner() {
        let service = service();
        let record = service.create(new_record("alice", -1200)).await.unwrap();

        assert!(!record.id.is_empty());
        assert_eq!(record.owner_id, "alice");
        assert_eq!(service.list_by_owner("alice").await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_create_requires_owner() {
        let err = service().create(new_record(" ", -1200)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_by_owner_only_returns_owner_records() {
        let service = service();
        service.create(new_record("alice", -1200)).await.unwrap();
        service.create(new_record("bob", 500)).await.unwrap();

        let records = service.list_by_owner("alice").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owner_id, "alice");
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let service = service();
        let record = service.create(new_record("alice", -1200)).await.unwrap();

        let updated = service
            .update(
                &record.id,
                RecordPatch::default().payment_method(PaymentMethod::CreditCard),
            )
            .await
            .unwrap();

        assert_eq!(updated.payment_method, PaymentMethod::CreditCard);
        assert_eq!(updated.amount, record.amount);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_record_are_not_found() {
        let service = service();

        let err = service
            .update("missing", RecordPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::NotFound(_))
        ));

        let err = service.delete("missing").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_after_delete_does_not_restore_record() {
        let service = service();
        let record = service.create(new_record("alice", -1200)).await.unwrap();
        service.delete(&record.id).await.unwrap();

        let err = service
            .update(&record.id, RecordPatch::default().amount(Amount::from_cents(-50)))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::NotFound(_))
        ));
        assert!(service.list_by_owner("alice").await.unwrap().is_empty());
    }
}
