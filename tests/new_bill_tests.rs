//! Integration tests for the NewBill page container

use async_trait::async_trait;
use billed::prelude::*;
use std::sync::Mutex;
use tokio::sync::Notify;

fn recorder() -> (Arc<dyn Navigator>, Arc<Mutex<Vec<String>>>) {
    let routes = Arc::new(Mutex::new(Vec::new()));
    let sink = routes.clone();
    let navigator: Arc<dyn Navigator> =
        Arc::new(move |path: &str| sink.lock().unwrap().push(path.to_string()));
    (navigator, routes)
}

fn filled_fields() -> FormFields {
    FormFields {
        bill_type: "Hôtel et logement".to_string(),
        name: "encore".to_string(),
        amount: "400".to_string(),
        date: "2004-04-04".to_string(),
        vat: "80".to_string(),
        pct: "20".to_string(),
        commentary: "séminaire billed".to_string(),
    }
}

fn session() -> SessionContext {
    let storage = InMemorySessionStorage::new();
    storage.set_item("user", r#"{"type": "Employee", "email": "user@email.com"}"#);
    SessionContext::load(&storage).unwrap()
}

// =============================================================================
// Submission Payload Tests
// =============================================================================

mod payload_tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_submit_builds_pending_payload() {
        let store = InMemoryStore::new();
        let handle = store.bills_handle();
        let (navigator, routes) = recorder();
        let form = NewBillForm::new(store, session(), navigator);

        let receipt = form
            .handle_file_selected(&[SelectedFile::new("image.png", "image/png", b"img".to_vec())])
            .await
            .unwrap();
        form.handle_submit(&filled_fields()).await.unwrap();

        let updated = handle.updated_payloads();
        assert_eq!(updated.len(), 1);
        let sent: serde_json::Value = serde_json::from_str(&updated[0].data).unwrap();

        assert_eq!(sent["email"], "user@email.com");
        assert_eq!(sent["status"], "pending");
        assert!(sent["amount"].is_number());
        assert_eq!(sent["amount"].as_f64(), Some(400.0));
        assert!(sent["pct"].is_number());
        assert_eq!(sent["pct"].as_f64(), Some(20.0));
        assert_eq!(sent["type"], "Hôtel et logement");
        assert_eq!(sent["fileUrl"], receipt.file_url.as_str());
        assert_eq!(sent["fileName"], "image.png");

        assert_eq!(*routes.lock().unwrap(), vec![RoutesPath::BILLS]);
    }

    #[tokio::test]
    async fn test_submit_without_upload_sends_null_file_fields() {
        let store = InMemoryStore::new();
        let handle = store.bills_handle();
        let (navigator, _) = recorder();
        let form = NewBillForm::new(store, session(), navigator);

        let fields = FormFields {
            bill_type: "type".to_string(),
            name: "name".to_string(),
            amount: "3000".to_string(),
            date: "date".to_string(),
            vat: "vat".to_string(),
            pct: "25".to_string(),
            commentary: "commentary".to_string(),
        };
        form.handle_submit(&fields).await.unwrap();

        let updated = handle.updated_payloads();
        assert!(updated[0].selector.is_none());

        let sent: serde_json::Value = serde_json::from_str(&updated[0].data).unwrap();
        assert_eq!(
            sent,
            serde_json::json!({
                "email": "user@email.com",
                "type": "type",
                "name": "name",
                "amount": 3000.0,
                "date": "date",
                "vat": "vat",
                "pct": 25.0,
                "commentary": "commentary",
                "fileUrl": null,
                "fileName": null,
                "status": "pending"
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_pct_blocks_submission() {
        let store = InMemoryStore::new();
        let handle = store.bills_handle();
        let (navigator, routes) = recorder();
        let form = NewBillForm::new(store, session(), navigator);

        let mut fields = filled_fields();
        fields.pct = "vingt".to_string();

        let err = form.handle_submit(&fields).await.unwrap_err();

        assert!(matches!(
            err,
            FormError::Validation(ValidationError::InvalidNumber { ref field, .. }) if field == "pct"
        ));
        assert_eq!(handle.calls(StoreOperation::Update), 0);
        assert!(routes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_custom_upload_config() {
        let store = InMemoryStore::new();
        let (navigator, _) = recorder();
        let form = NewBillForm::new(store, session(), navigator).with_upload_config(
            UploadConfig {
                accepted_extensions: vec!["pdf".to_string()],
                default_pct: 10.0,
            },
        );

        form.handle_file_selected(&[SelectedFile::new(
            "facture.pdf",
            "application/pdf",
            vec![],
        )])
        .await
        .unwrap();

        let mut fields = filled_fields();
        fields.pct = String::new();
        assert_eq!(form.build_payload(&fields).unwrap().pct, 10.0);
    }
}

// =============================================================================
// State Machine Tests
// =============================================================================

/// Bills resource whose `create` waits until released
struct GatedBills {
    gate: Arc<Notify>,
}

#[async_trait]
impl ResourceStore for GatedBills {
    fn resource(&self) -> &str {
        "bills"
    }

    async fn list(&self) -> Result<Vec<BillRecord>, StoreError> {
        Ok(vec![])
    }

    async fn create(&self, _payload: CreatePayload) -> Result<UploadReceipt, StoreError> {
        self.gate.notified().await;
        Ok(UploadReceipt {
            file_url: "https://test.storage.tld/image.png".to_string(),
            key: "1234".to_string(),
        })
    }

    async fn update(&self, payload: UpdatePayload) -> Result<BillRecord, StoreError> {
        let bill: NewBillPayload = serde_json::from_str(&payload.data)
            .map_err(|e| StoreError::rejected(e.to_string()))?;
        Ok(BillRecord::from_payload(
            payload.selector.unwrap_or_default(),
            bill,
        ))
    }
}

struct GatedStore {
    bills: Arc<GatedBills>,
}

impl Store for GatedStore {
    fn resource(&self, _name: &str) -> Arc<dyn ResourceStore> {
        self.bills.clone()
    }
}

mod state_tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_while_uploading_is_busy() {
        let gate = Arc::new(Notify::new());
        let store = GatedStore {
            bills: Arc::new(GatedBills { gate: gate.clone() }),
        };
        let (navigator, routes) = recorder();
        let form = NewBillForm::new(store, session(), navigator);
        let files = [SelectedFile::new("image.png", "image/png", vec![])];
        let fields = filled_fields();

        let (upload, submit, ()) = tokio::join!(
            form.handle_file_selected(&files),
            async {
                let result = form.handle_submit(&fields).await;
                assert_eq!(form.state(), FormState::FileUploading);
                result
            },
            async { gate.notify_one() },
        );

        assert_eq!(
            submit.unwrap_err(),
            FormError::Busy {
                operation: "submission",
                state: "uploading",
            }
        );
        assert_eq!(upload.unwrap().key, "1234");
        assert_eq!(form.state(), FormState::FileReady);
        assert!(routes.lock().unwrap().is_empty());

        let record = form.handle_submit(&fields).await.unwrap();
        assert_eq!(record.id, "1234");
        assert_eq!(form.state(), FormState::Done);
    }

    #[tokio::test]
    async fn test_second_upload_while_uploading_is_busy() {
        let gate = Arc::new(Notify::new());
        let store = GatedStore {
            bills: Arc::new(GatedBills { gate: gate.clone() }),
        };
        let (navigator, _) = recorder();
        let form = NewBillForm::new(store, session(), navigator);
        let files = [SelectedFile::new("image.jpg", "image/jpeg", vec![])];

        let (first, second, ()) = tokio::join!(
            form.handle_file_selected(&files),
            form.handle_file_selected(&files),
            async { gate.notify_one() },
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(FormError::Busy { .. })));
    }

    #[tokio::test]
    async fn test_form_starts_idle() {
        let (navigator, _) = recorder();
        let form = NewBillForm::new(InMemoryStore::new(), session(), navigator);

        assert_eq!(form.state(), FormState::Idle);
        assert!(form.file_url().is_none());
        assert!(form.file_name().is_none());
        assert!(form.bill_id().is_none());
    }
}
