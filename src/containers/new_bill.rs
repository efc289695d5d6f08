//! NewBill page container: attachment upload and bill submission
//!
//! The form walks through a small state machine:
//!
//! ```text
//! Idle ──upload──▶ FileUploading ──ok──▶ FileReady ──submit──▶ Submitting ──ok──▶ Done
//!   ▲                  │ err                                       │ err
//!   └──────────────────┘               Idle / FileReady ◀──────────┘
//! ```
//!
//! Submitting straight from `Idle` is allowed; the bill is then sent without
//! attachment fields. Only one upload or submission can be in flight at a
//! time, a second one is refused with [`FormError::Busy`].

use crate::config::UploadConfig;
use crate::core::bill::{BillRecord, BillStatus, NewBillPayload, UploadReceipt};
use crate::core::error::{FieldError, FormError, ValidationError};
use crate::core::routes::{Navigator, RoutesPath};
use crate::core::session::SessionContext;
use crate::core::store::{
    CreatePayload, FilePart, MultipartForm, NO_CONTENT_TYPE_HEADER, Store, UpdatePayload,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use validator::Validate;

/// Where the form stands in its upload/submit lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    FileUploading,
    FileReady,
    Submitting,
    Done,
}

impl FormState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormState::Idle => "idle",
            FormState::FileUploading => "uploading",
            FormState::FileReady => "file-ready",
            FormState::Submitting => "submitting",
            FormState::Done => "done",
        }
    }

    fn in_flight(&self) -> bool {
        matches!(self, FormState::FileUploading | FormState::Submitting)
    }
}

/// A file picked in the attachment input; its content is never inspected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// Raw values of the form inputs at submit time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub bill_type: String,
    pub name: String,
    pub amount: String,
    pub date: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

#[derive(Debug, Clone, Default)]
struct Attachment {
    file_url: Option<String>,
    file_name: Option<String>,
    bill_id: Option<String>,
}

#[derive(Debug)]
struct Inner {
    state: FormState,
    attachment: Attachment,
}

/// Container behind the NewBill page
pub struct NewBillForm<S> {
    store: S,
    session: SessionContext,
    navigator: Arc<dyn Navigator>,
    upload: UploadConfig,
    inner: Mutex<Inner>,
}

impl<S: Store> NewBillForm<S> {
    pub fn new(store: S, session: SessionContext, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            session,
            navigator,
            upload: UploadConfig::default(),
            inner: Mutex::new(Inner {
                state: FormState::Idle,
                attachment: Attachment::default(),
            }),
        }
    }

    pub fn with_upload_config(mut self, upload: UploadConfig) -> Self {
        self.upload = upload;
        self
    }

    pub fn state(&self) -> FormState {
        self.lock().state
    }

    pub fn file_url(&self) -> Option<String> {
        self.lock().attachment.file_url.clone()
    }

    pub fn file_name(&self) -> Option<String> {
        self.lock().attachment.file_name.clone()
    }

    /// Id of the bill created by the upload step
    pub fn bill_id(&self) -> Option<String> {
        self.lock().attachment.bill_id.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Move to `next` unless another operation is in flight
    ///
    /// Returns the state being left and the attachment as seen under the
    /// same lock, so the caller works from one consistent view.
    fn begin(
        &self,
        next: FormState,
        operation: &'static str,
    ) -> Result<(FormState, Attachment), FormError> {
        let mut inner = self.lock();
        if inner.state.in_flight() {
            warn!(operation, state = inner.state.as_str(), "form busy");
            return Err(FormError::Busy {
                operation,
                state: inner.state.as_str(),
            });
        }
        debug!(from = inner.state.as_str(), to = next.as_str(), "form transition");
        let previous = std::mem::replace(&mut inner.state, next);
        Ok((previous, inner.attachment.clone()))
    }

    /// Upload the first selected file as the bill attachment
    ///
    /// Sends a multipart `create` with the file and the session owner's
    /// email. On success the returned URL and key are kept for
    /// [`handle_submit`](Self::handle_submit); on failure the form returns
    /// to `Idle` and the error is returned unchanged.
    pub async fn handle_file_selected(
        &self,
        files: &[SelectedFile],
    ) -> Result<UploadReceipt, FormError> {
        let file = files.first().ok_or_else(|| ValidationError::MissingField {
            field: "file".to_string(),
        })?;

        if !self.upload.accepts(&file.name) {
            return Err(ValidationError::UnsupportedFile {
                file_name: file.name.clone(),
                accepted: self.upload.accepted_extensions.join(", "),
            }
            .into());
        }

        let _ = self.begin(FormState::FileUploading, "upload")?;

        let form = MultipartForm::new()
            .file(
                "file",
                FilePart {
                    file_name: file.name.clone(),
                    mime: file.mime.clone(),
                    bytes: file.bytes.clone(),
                },
            )
            .text("email", self.session.email.clone());
        let payload = CreatePayload::new(form).with_header(NO_CONTENT_TYPE_HEADER, "true");

        let result = self.store.bills().create(payload).await;

        let mut inner = self.lock();
        match result {
            Ok(receipt) => {
                info!(key = %receipt.key, file_name = %file.name, "attachment uploaded");
                inner.attachment = Attachment {
                    file_url: Some(receipt.file_url.clone()),
                    file_name: Some(file.name.clone()),
                    bill_id: Some(receipt.key.clone()),
                };
                inner.state = FormState::FileReady;
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, "attachment upload failed");
                inner.attachment = Attachment::default();
                inner.state = FormState::Idle;
                Err(e.into())
            }
        }
    }

    /// Build the submission payload from the current field values
    ///
    /// Amount and pct must parse as finite numbers; an empty pct takes the
    /// configured default. Nothing is sent when this fails.
    pub fn build_payload(&self, fields: &FormFields) -> Result<NewBillPayload, ValidationError> {
        let (amount, pct) = self.parse_numbers(fields)?;
        let attachment = self.lock().attachment.clone();
        self.assemble(fields, amount, pct, &attachment)
    }

    fn parse_numbers(&self, fields: &FormFields) -> Result<(f64, f64), ValidationError> {
        let amount_raw = fields.amount.trim();
        if amount_raw.is_empty() {
            return Err(ValidationError::MissingField {
                field: "amount".to_string(),
            });
        }
        let amount = parse_number("amount", amount_raw)?;

        let pct_raw = fields.pct.trim();
        let pct = if pct_raw.is_empty() {
            self.upload.default_pct
        } else {
            parse_number("pct", pct_raw)?
        };

        Ok((amount, pct))
    }

    fn assemble(
        &self,
        fields: &FormFields,
        amount: f64,
        pct: f64,
        attachment: &Attachment,
    ) -> Result<NewBillPayload, ValidationError> {
        let payload = NewBillPayload {
            email: self.session.email.clone(),
            bill_type: fields.bill_type.clone(),
            name: fields.name.clone(),
            amount,
            date: fields.date.clone(),
            vat: fields.vat.clone(),
            pct,
            commentary: fields.commentary.clone(),
            file_url: attachment.file_url.clone(),
            file_name: attachment.file_name.clone(),
            status: BillStatus::Pending,
        };
        payload.validate()?;

        Ok(payload)
    }

    /// Submit the bill and go back to the Bills page
    ///
    /// Sends the JSON payload through `update`, targeting the bill created by
    /// the upload step when there was one. Navigation only happens once the
    /// store accepted the bill.
    pub async fn handle_submit(&self, fields: &FormFields) -> Result<BillRecord, FormError> {
        let (amount, pct) = self.parse_numbers(fields)?;

        // Payload and selector both come from the attachment seen on entry.
        let (previous, attachment) = self.begin(FormState::Submitting, "submission")?;
        let prepared = self.assemble(fields, amount, pct, &attachment).and_then(|payload| {
            serde_json::to_string(&payload).map_err(|e| {
                ValidationError::FieldErrors(vec![FieldError {
                    field: "payload".to_string(),
                    message: e.to_string(),
                }])
            })
        });
        let data = match prepared {
            Ok(data) => data,
            Err(e) => {
                self.lock().state = previous;
                return Err(e.into());
            }
        };
        let selector = attachment.bill_id;

        let result = self
            .store
            .bills()
            .update(UpdatePayload { data, selector })
            .await;

        let record = {
            let mut inner = self.lock();
            match result {
                Ok(record) => {
                    inner.state = FormState::Done;
                    record
                }
                Err(e) => {
                    warn!(error = %e, "bill submission failed");
                    inner.state = if inner.attachment.bill_id.is_some() {
                        FormState::FileReady
                    } else {
                        FormState::Idle
                    };
                    return Err(e.into());
                }
            }
        };

        info!(id = %record.id, "bill submitted");
        self.navigator.navigate(RoutesPath::BILLS);
        Ok(record)
    }
}

fn parse_number(field: &str, raw: &str) -> Result<f64, ValidationError> {
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
}
