use crate::application::summary::Summary;
use crate::domain::error::RecordError;
use crate::domain::gateway::RecordGateway;
use crate::domain::models::{FinancialRecord, NewRecord, RecordDraft, RecordPatch};
use crate::domain::session::Session;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Loading { owner_id: String },
    Loaded { owner_id: String },
}

/// Local mirror of one owner's records.
///
/// Mutations commit locally only after the server confirms them. Failures are
/// logged and returned; the collection is left as it was. Fetch failures are
/// fail-soft: the collection ends up empty.
pub struct RecordStore<G: RecordGateway> {
    gateway: G,
    state: SyncState,
    records: Vec<FinancialRecord>,
}

impl<G: RecordGateway> RecordStore<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: SyncState::Idle,
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[FinancialRecord] {
        &self.records
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn owner_id(&self) -> Option<&str> {
        match &self.state {
            SyncState::Idle => None,
            SyncState::Loading { owner_id } | SyncState::Loaded { owner_id } => Some(owner_id),
        }
    }

    pub fn find(&self, id: &str) -> Option<&FinancialRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn summary(&self) -> Summary {
        Summary::from_records(&self.records)
    }

    /// Follows a session change: any session triggers a full refetch,
    /// no session drops back to `Idle`.
    pub async fn sync_owner(&mut self, session: Option<&Session>) -> Result<(), RecordError> {
        match session {
            Some(session) => self.fetch_all(&session.id).await,
            None => {
                self.reset();
                Ok(())
            }
        }
    }

    pub fn reset(&mut self) {
        debug!("Record store reset to idle");
        self.state = SyncState::Idle;
        self.records.clear();
    }

    /// Replaces the collection with the owner's records from the server.
    ///
    /// Whatever the outcome, the store ends up `Loaded` for `owner_id`. On
    /// any error the collection is empty and the error is returned.
    #[instrument(skip(self))]
    pub async fn fetch_all(&mut self, owner_id: &str) -> Result<(), RecordError> {
        self.state = SyncState::Loading {
            owner_id: owner_id.to_string(),
        };
        self.records.clear();

        let result = match self.gateway.fetch_all(owner_id).await {
            Ok(body) => decode_records(body),
            Err(e) => Err(RecordError::Gateway(e)),
        };

        let outcome = match result {
            Ok(records) => {
                let fetched = records.len();
                self.records = records
                    .into_iter()
                    .filter(|r| r.owner_id == owner_id)
                    .collect();
                if self.records.len() != fetched {
                    warn!(
                        dropped = fetched - self.records.len(),
                        "Server returned records of another owner"
                    );
                }
                info!(count = self.records.len(), "Records loaded");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error fetching records");
                Err(e)
            }
        };

        self.state = SyncState::Loaded {
            owner_id: owner_id.to_string(),
        };
        outcome
    }

    /// Creates a record for the current owner and appends the server's copy.
    #[instrument(skip(self, draft), fields(amount = %draft.amount))]
    pub async fn add_record(&mut self, draft: RecordDraft) -> Result<&FinancialRecord, RecordError> {
        let Some(owner_id) = self.owner_id() else {
            error!("Cannot add a record without a logged-in user");
            return Err(RecordError::NoOwner);
        };
        let new_record = NewRecord {
            owner_id: owner_id.to_string(),
            draft,
        };

        match self.gateway.create(&new_record).await {
            Ok(record) => {
                info!(record_id = %record.id, "Record added");
                self.records.push(record);
                Ok(&self.records[self.records.len() - 1])
            }
            Err(e) => {
                error!(error = %e, "Error adding record");
                Err(e.into())
            }
        }
    }

    /// Sends a partial update and merges the fields the server echoes back.
    #[instrument(skip(self, patch))]
    pub async fn update_record(&mut self, id: &str, patch: RecordPatch) -> Result<(), RecordError> {
        match self.gateway.update(id, &patch).await {
            Ok(changes) => {
                match self.records.iter_mut().find(|r| r.id == id) {
                    Some(record) => record.apply(&changes),
                    None => debug!("Updated record is not in the local collection"),
                }
                info!("Record updated");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error updating record");
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_record(&mut self, id: &str) -> Result<(), RecordError> {
        match self.gateway.delete(id).await {
            Ok(()) => {
                self.records.retain(|r| r.id != id);
                info!("Record deleted");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error deleting record");
                Err(e.into())
            }
        }
    }
}

/// Only a non-array body is an error. Elements that do not decode are
/// skipped so one bad record cannot hide the rest.
fn decode_records(body: serde_json::Value) -> Result<Vec<FinancialRecord>, RecordError> {
    let serde_json::Value::Array(items) = body else {
        warn!("Record list response is not an array");
        return Err(RecordError::Malformed("expected a JSON array".to_string()));
    };

    let total = items.len();
    let mut skipped = 0usize;
    let records: Vec<FinancialRecord> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<FinancialRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                skipped += 1;
                debug!(error = %e, "Skipping undecodable record");
                None
            }
        })
        .collect();

    if skipped > 0 {
        warn!(skipped, total, "Some records in the response could not be decoded");
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::GatewayError;
    use crate::domain::models::{Amount, Category, PaymentMethod};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeRecords {
        lists: HashMap<String, Value>,
        fail_mutations: bool,
        update_echo: Option<RecordPatch>,
        next_id: AtomicUsize,
        created: Mutex<Vec<NewRecord>>,
    }

    fn server_error() -> GatewayError {
        GatewayError::Status {
            status: 500,
            message: Some("boom".to_string()),
        }
    }

    #[async_trait]
    impl RecordGateway for FakeRecords {
        async fn fetch_all(&self, owner_id: &str) -> Result<Value, GatewayError> {
            self.lists.get(owner_id).cloned().ok_or_else(server_error)
        }

        async fn create(&self, record: &NewRecord) -> Result<FinancialRecord, GatewayError> {
            self.created.lock().unwrap().push(record.clone());
            if self.fail_mutations {
                return Err(server_error());
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
            Ok(FinancialRecord::from_draft(
                id,
                record.owner_id.clone(),
                record.draft.clone(),
            ))
        }

        async fn update(&self, _: &str, patch: &RecordPatch) -> Result<RecordPatch, GatewayError> {
            if self.fail_mutations {
                return Err(server_error());
            }
            Ok(self.update_echo.clone().unwrap_or_else(|| patch.clone()))
        }

        async fn delete(&self, _: &str) -> Result<(), GatewayError> {
            if self.fail_mutations {
                return Err(server_error());
            }
            Ok(())
        }
    }

    fn record_json(id: &str, owner: &str, amount: f64, category: &str) -> Value {
        json!({
            "_id": id,
            "userId": owner,
            "date": "2024-03-01T00:00:00.000Z",
            "description": format!("record {id}"),
            "amount": amount,
            "category": category,
            "paymentMethod": "Credit Card"
        })
    }

    fn draft(amount: i64, category: Category) -> RecordDraft {
        RecordDraft {
            date: Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(),
            description: "paycheck".to_string(),
            amount: Amount::from_cents(amount),
            category,
            payment_method: PaymentMethod::default(),
        }
    }

    fn session(id: &str) -> Session {
        Session {
            id: id.to_string(),
            username: id.to_string(),
            email: format!("{id}@example.com"),
        }
    }

    fn gateway_with_alice() -> FakeRecords {
        let mut gateway = FakeRecords {
            next_id: AtomicUsize::new(2),
            ..Default::default()
        };
        gateway.lists.insert(
            "alice".to_string(),
            json!([record_json("1", "alice", -20.0, "Food & Dining")]),
        );
        gateway
    }

    async fn loaded_store() -> RecordStore<FakeRecords> {
        let mut store = RecordStore::new(gateway_with_alice());
        store.fetch_all("alice").await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_new_store_is_idle_and_empty() {
        let store = RecordStore::new(FakeRecords::default());
        assert_eq!(store.state(), &SyncState::Idle);
        assert!(store.records().is_empty());
        assert!(store.owner_id().is_none());
    }

    #[tokio::test]
    async fn test_fetch_all_loads_owner_records() {
        let store = loaded_store().await;

        assert_eq!(
            store.state(),
            &SyncState::Loaded {
                owner_id: "alice".to_string()
            }
        );
        assert_eq!(store.records().len(), 1);
        assert!(store.records().iter().all(|r| r.owner_id == "alice"));
    }

    #[tokio::test]
    async fn test_fetch_all_drops_records_of_other_owners() {
        let mut gateway = FakeRecords::default();
        gateway.lists.insert(
            "alice".to_string(),
            json!([
                record_json("1", "alice", -20.0, "Food & Dining"),
                record_json("9", "mallory", 5.0, "Other")
            ]),
        );
        let mut store = RecordStore::new(gateway);

        store.fetch_all("alice").await.unwrap();

        let ids: Vec<&str> = store.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[tokio::test]
    async fn test_fetch_all_non_array_falls_back_to_empty() {
        let mut gateway = gateway_with_alice();
        gateway
            .lists
            .insert("bob".to_string(), json!({ "message": "oops" }));
        let mut store = RecordStore::new(gateway);
        store.fetch_all("alice").await.unwrap();

        let result = store.fetch_all("bob").await;

        assert!(matches!(result, Err(RecordError::Malformed(_))));
        assert!(store.records().is_empty());
        assert_eq!(store.owner_id(), Some("bob"));
    }

    #[tokio::test]
    async fn test_fetch_all_skips_undecodable_elements() {
        let mut without_description = record_json("2", "alice", 5.0, "Other");
        without_description
            .as_object_mut()
            .unwrap()
            .remove("description");
        let mut gateway = FakeRecords::default();
        gateway.lists.insert(
            "alice".to_string(),
            json!([
                record_json("1", "alice", -20.0, "Food & Dining"),
                without_description,
                record_json("3", "alice", 1e17, "Other"),
                record_json("4", "alice", 1e17, "Other")
            ]),
        );
        let mut store = RecordStore::new(gateway);

        store.fetch_all("alice").await.unwrap();

        let ids: Vec<&str> = store.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
        assert_eq!(store.summary().total.to_string(), "-20.00");
    }

    #[tokio::test]
    async fn test_fetch_all_failure_falls_back_to_empty() {
        let mut store = loaded_store().await;

        let result = store.fetch_all("nobody").await;

        assert!(matches!(result, Err(RecordError::Gateway(_))));
        assert!(store.records().is_empty());
        assert_eq!(
            store.state(),
            &SyncState::Loaded {
                owner_id: "nobody".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_add_record_without_owner_sends_nothing() {
        let mut store = RecordStore::new(gateway_with_alice());

        let result = store.add_record(draft(10000, Category::Income)).await;

        assert_eq!(result.unwrap_err(), RecordError::NoOwner);
        assert!(store.gateway.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_record_injects_owner_and_appends_server_copy() {
        let mut store = loaded_store().await;

        let added = store
            .add_record(draft(10000, Category::Income))
            .await
            .unwrap()
            .clone();

        assert_eq!(added.id, "2");
        assert_eq!(added.owner_id, "alice");
        assert_eq!(store.records().len(), 2);
        assert_eq!(store.gateway.created.lock().unwrap()[0].owner_id, "alice");
    }

    #[tokio::test]
    async fn test_add_record_failure_leaves_collection_unchanged() {
        let mut store = loaded_store().await;
        store.gateway.fail_mutations = true;

        let result = store.add_record(draft(10000, Category::Income)).await;

        assert!(matches!(result, Err(RecordError::Gateway(_))));
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn test_update_record_merges_only_returned_fields() {
        let mut store = loaded_store().await;
        store.gateway.update_echo = Some(RecordPatch::default().amount(Amount::from_cents(-5000)));
        let before = store.find("1").unwrap().clone();

        store
            .update_record("1", RecordPatch::default().amount(Amount::from_cents(-5000)))
            .await
            .unwrap();

        let after = store.find("1").unwrap();
        assert_eq!(after.amount, Amount::from_cents(-5000));
        assert_eq!(after.description, before.description);
        assert_eq!(after.category, before.category);
        assert_eq!(after.payment_method, before.payment_method);
        assert_eq!(after.date, before.date);
    }

    #[tokio::test]
    async fn test_update_record_failure_leaves_record_unchanged() {
        let mut store = loaded_store().await;
        store.gateway.fail_mutations = true;
        let before = store.find("1").unwrap().clone();

        let result = store
            .update_record("1", RecordPatch::default().description("changed"))
            .await;

        assert!(result.is_err());
        assert_eq!(store.find("1"), Some(&before));
    }

    #[tokio::test]
    async fn test_delete_record_removes_matching_entry() {
        let mut store = loaded_store().await;
        store
            .add_record(draft(10000, Category::Income))
            .await
            .unwrap();

        store.delete_record("1").await.unwrap();

        assert_eq!(store.records().len(), 1);
        assert!(store.find("1").is_none());
    }

    #[tokio::test]
    async fn test_delete_absent_id_keeps_count() {
        let mut store = loaded_store().await;

        store.delete_record("does-not-exist").await.unwrap();

        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_record() {
        let mut store = loaded_store().await;
        store.gateway.fail_mutations = true;

        assert!(store.delete_record("1").await.is_err());
        assert!(store.find("1").is_some());
    }

    #[tokio::test]
    async fn test_owner_switch_replaces_whole_collection() {
        let mut gateway = gateway_with_alice();
        gateway.lists.insert(
            "bob".to_string(),
            json!([
                record_json("b1", "bob", 12.0, "Travel"),
                record_json("b2", "bob", -3.0, "Shopping")
            ]),
        );
        let mut store = RecordStore::new(gateway);
        store.sync_owner(Some(&session("alice"))).await.unwrap();

        store.sync_owner(None).await.unwrap();
        assert_eq!(store.state(), &SyncState::Idle);
        assert!(store.records().is_empty());

        store.sync_owner(Some(&session("bob"))).await.unwrap();
        assert_eq!(store.records().len(), 2);
        assert!(store.records().iter().all(|r| r.owner_id == "bob"));
    }

    #[tokio::test]
    async fn test_dashboard_total_follows_mutations() {
        let mut store = loaded_store().await;
        assert_eq!(store.summary().total.to_string(), "-20.00");

        let added = store
            .add_record(draft(10000, Category::Income))
            .await
            .unwrap();
        assert_eq!(added.id, "2");

        assert_eq!(store.summary().total.to_string(), "80.00");
    }
}
