//! In-memory implementation of Store for testing and development

use crate::core::bill::{BillRecord, NewBillPayload, UploadReceipt};
use crate::core::error::StoreError;
use crate::core::store::{CreatePayload, FilePart, ResourceStore, Store, UpdatePayload};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Store operation, used to count calls and inject failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    List,
    Create,
    Update,
}

/// In-memory store implementation
///
/// Hands out one [`InMemoryResourceStore`] per resource name, created on
/// first access and shared afterwards. Clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    resources: Arc<RwLock<HashMap<String, Arc<InMemoryResourceStore>>>>,
}

impl InMemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose bills resource holds `records`
    pub fn with_bills(records: Vec<BillRecord>) -> Self {
        let store = Self::new();
        store.resource_handle("bills").seed(records);
        store
    }

    /// Concrete handle on a resource, for seeding and inspection
    pub fn resource_handle(&self, name: &str) -> Arc<InMemoryResourceStore> {
        let existing = self
            .resources
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned();
        if let Some(resource) = existing {
            return resource;
        }

        self.resources
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryResourceStore::new(name)))
            .clone()
    }

    /// Concrete handle on the bills resource
    pub fn bills_handle(&self) -> Arc<InMemoryResourceStore> {
        self.resource_handle("bills")
    }
}

impl Store for InMemoryStore {
    fn resource(&self, name: &str) -> Arc<dyn ResourceStore> {
        self.resource_handle(name)
    }
}

/// One in-memory resource
///
/// Records keep their insertion order. Every call is counted and recorded
/// so tests can assert on what reached the store.
pub struct InMemoryResourceStore {
    name: String,
    records: RwLock<IndexMap<String, BillRecord>>,
    files: RwLock<IndexMap<String, FilePart>>,
    failures: RwLock<HashMap<StoreOperation, StoreError>>,
    created: RwLock<Vec<CreatePayload>>,
    updated: RwLock<Vec<UpdatePayload>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl InMemoryResourceStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: RwLock::new(IndexMap::new()),
            files: RwLock::new(IndexMap::new()),
            failures: RwLock::new(HashMap::new()),
            created: RwLock::new(Vec::new()),
            updated: RwLock::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
        }
    }

    /// Insert records as-is, keeping their ids
    pub fn seed(&self, records: Vec<BillRecord>) {
        if let Ok(mut stored) = self.records.write() {
            for record in records {
                stored.insert(record.id.clone(), record);
            }
        }
    }

    /// Make every later call of `operation` fail with `error`
    pub fn fail_with(&self, operation: StoreOperation, error: StoreError) {
        if let Ok(mut failures) = self.failures.write() {
            failures.insert(operation, error);
        }
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        if let Ok(mut failures) = self.failures.write() {
            failures.clear();
        }
    }

    /// Number of calls made for `operation`, failed ones included
    pub fn calls(&self, operation: StoreOperation) -> usize {
        match operation {
            StoreOperation::List => self.list_calls.load(Ordering::SeqCst),
            StoreOperation::Create => self.create_calls.load(Ordering::SeqCst),
            StoreOperation::Update => self.update_calls.load(Ordering::SeqCst),
        }
    }

    /// Payloads received by `create`, in call order
    pub fn created_payloads(&self) -> Vec<CreatePayload> {
        self.created.read().map(|c| c.clone()).unwrap_or_default()
    }

    /// Payloads received by `update`, in call order
    pub fn updated_payloads(&self) -> Vec<UpdatePayload> {
        self.updated.read().map(|u| u.clone()).unwrap_or_default()
    }

    /// Current record stored under `id`
    pub fn record(&self, id: &str) -> Option<BillRecord> {
        self.records.read().ok().and_then(|r| r.get(id).cloned())
    }

    /// File uploaded along with the bill `key`
    pub fn file(&self, key: &str) -> Option<FilePart> {
        self.files.read().ok().and_then(|f| f.get(key).cloned())
    }

    fn injected_failure(&self, operation: StoreOperation) -> Option<StoreError> {
        self.failures
            .read()
            .ok()
            .and_then(|f| f.get(&operation).cloned())
    }

    fn lock_error(&self, operation: &str) -> StoreError {
        StoreError::Transport {
            resource: self.name.clone(),
            operation: operation.to_string(),
            message: "Failed to acquire lock".to_string(),
        }
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    fn resource(&self) -> &str {
        &self.name
    }

    async fn list(&self) -> Result<Vec<BillRecord>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.injected_failure(StoreOperation::List) {
            return Err(error);
        }

        let records = self.records.read().map_err(|_| self.lock_error("list"))?;
        Ok(records.values().cloned().collect())
    }

    async fn create(&self, payload: CreatePayload) -> Result<UploadReceipt, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut created) = self.created.write() {
            created.push(payload.clone());
        }
        if let Some(error) = self.injected_failure(StoreOperation::Create) {
            return Err(error);
        }

        let file = payload
            .data
            .get_file("file")
            .cloned()
            .ok_or_else(|| StoreError::rejected("Missing 'file' part in upload"))?;
        let email = payload.data.get("email").unwrap_or_default().to_string();

        let key = Uuid::new_v4().to_string();
        let file_url = format!("memory://{}/{}/{}", self.name, key, file.file_name);

        let record = BillRecord {
            id: key.clone(),
            email,
            file_url: Some(file_url.clone()),
            file_name: Some(file.file_name.clone()),
            ..Default::default()
        };

        self.records
            .write()
            .map_err(|_| self.lock_error("create"))?
            .insert(key.clone(), record);
        self.files
            .write()
            .map_err(|_| self.lock_error("create"))?
            .insert(key.clone(), file);

        Ok(UploadReceipt { file_url, key })
    }

    async fn update(&self, payload: UpdatePayload) -> Result<BillRecord, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut updated) = self.updated.write() {
            updated.push(payload.clone());
        }
        if let Some(error) = self.injected_failure(StoreOperation::Update) {
            return Err(error);
        }

        let bill: NewBillPayload =
            serde_json::from_str(&payload.data).map_err(|e| StoreError::Decode {
                resource: self.name.clone(),
                message: e.to_string(),
            })?;

        let mut records = self.records.write().map_err(|_| self.lock_error("update"))?;

        let id = match payload.selector {
            Some(id) => {
                if !records.contains_key(&id) {
                    return Err(StoreError::NotFound {
                        resource: self.name.clone(),
                        id,
                    });
                }
                id
            }
            None => Uuid::new_v4().to_string(),
        };

        let comment_admin = records.get(&id).and_then(|r| r.comment_admin.clone());
        let mut record = BillRecord::from_payload(id.clone(), bill);
        record.comment_admin = comment_admin;
        records.insert(id, record.clone());

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bill::BillStatus;
    use crate::core::store::MultipartForm;

    fn record(id: &str, date: &str) -> BillRecord {
        BillRecord {
            id: id.to_string(),
            date: date.to_string(),
            amount: 100.0,
            ..Default::default()
        }
    }

    fn upload() -> CreatePayload {
        CreatePayload::new(
            MultipartForm::new()
                .file(
                    "file",
                    FilePart {
                        file_name: "image.png".to_string(),
                        mime: "image/png".to_string(),
                        bytes: b"img".to_vec(),
                    },
                )
                .text("email", "user@email.com"),
        )
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = InMemoryStore::with_bills(vec![
            record("b", "2004-04-04"),
            record("a", "2001-01-01"),
        ]);

        let records = store.bills().list().await.unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_bills_accessor_is_shared() {
        let store = InMemoryStore::new();
        store.bills().list().await.unwrap();
        store.bills().list().await.unwrap();

        assert_eq!(store.bills_handle().calls(StoreOperation::List), 2);
    }

    #[tokio::test]
    async fn test_create_stores_file_and_returns_key() {
        let store = InMemoryStore::new();

        let receipt = store.bills().create(upload()).await.unwrap();

        let handle = store.bills_handle();
        let record = handle.record(&receipt.key).unwrap();
        assert_eq!(record.email, "user@email.com");
        assert_eq!(record.file_url.as_deref(), Some(receipt.file_url.as_str()));
        assert_eq!(handle.file(&receipt.key).unwrap().bytes, b"img".to_vec());
    }

    #[tokio::test]
    async fn test_create_without_file_is_rejected() {
        let store = InMemoryStore::new();
        let payload = CreatePayload::new(MultipartForm::new().text("email", "a@a"));

        let err = store.bills().create(payload).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_update_unknown_selector() {
        let store = InMemoryStore::new();
        let data = serde_json::json!({
            "email": "a@a",
            "type": "Transports",
            "name": "",
            "amount": 1.0,
            "date": "2022-01-01",
            "vat": "",
            "pct": 20.0,
            "commentary": "",
            "fileUrl": null,
            "fileName": null,
            "status": "pending"
        })
        .to_string();

        let err = store
            .bills()
            .update(UpdatePayload {
                data: data.clone(),
                selector: Some("missing".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref id, .. } if id == "missing"));

        let created = store
            .bills()
            .update(UpdatePayload {
                data,
                selector: None,
            })
            .await
            .unwrap();
        assert_eq!(created.status, BillStatus::Pending);
        assert!(!created.id.is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_malformed_json() {
        let store = InMemoryStore::new();
        let err = store
            .bills()
            .update(UpdatePayload {
                data: "{not json".to_string(),
                selector: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_injected_failure_until_cleared() {
        let store = InMemoryStore::new();
        let handle = store.bills_handle();
        handle.fail_with(StoreOperation::List, StoreError::rejected("Erreur 404"));

        assert_eq!(
            store.bills().list().await.unwrap_err(),
            StoreError::rejected("Erreur 404")
        );

        handle.clear_failures();
        assert!(store.bills().list().await.unwrap().is_empty());
        assert_eq!(handle.calls(StoreOperation::List), 2);
    }

    #[tokio::test]
    async fn test_resource_handle_survives_poisoned_lock() {
        let store = InMemoryStore::new();
        let shared = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.resources.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(store.resources.is_poisoned());

        let first = store.bills_handle();
        first.seed(vec![record("a", "2004-04-04")]);
        let second = store.bills_handle();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.bills().list().await.unwrap().len(), 1);
    }
}
