//! Bill records and the payloads built around them

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Lifecycle status of a bill, owned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One expense report entry as returned by the store
///
/// Field names follow the wire format (`fileUrl`, `commentAdmin`, ...).
/// Every field defaults when absent so partially filled records still
/// deserialize.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillRecord {
    /// Assigned by the store, never changed by the client
    pub id: String,

    pub amount: f64,

    /// Raw ISO-like date, or its display form after formatting
    pub date: String,

    pub status: BillStatus,

    /// Free-text expense category ("Transports", "Hôtel et logement", ...)
    #[serde(rename = "type")]
    pub bill_type: String,

    pub name: String,
    pub commentary: String,
    pub vat: String,
    pub pct: Option<f64>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,

    /// Owner identifier
    pub email: String,

    pub comment_admin: Option<String>,
}

impl BillRecord {
    /// Build the stored record for a submitted payload
    pub fn from_payload(id: impl Into<String>, payload: NewBillPayload) -> Self {
        Self {
            id: id.into(),
            amount: payload.amount,
            date: payload.date,
            status: payload.status,
            bill_type: payload.bill_type,
            name: payload.name,
            commentary: payload.commentary,
            vat: payload.vat,
            pct: Some(payload.pct),
            file_url: payload.file_url,
            file_name: payload.file_name,
            email: payload.email,
            comment_admin: None,
        }
    }
}

/// Client-side submission payload, built once per submit
///
/// Mirrors [`BillRecord`] without `id`. `status` is always
/// [`BillStatus::Pending`] when built by the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBillPayload {
    #[validate(email(message = "owner email is not a valid address"))]
    pub email: String,

    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "expense type is required"))]
    pub bill_type: String,

    pub name: String,

    #[validate(range(min = 0.0, message = "amount must not be negative"))]
    pub amount: f64,

    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,

    pub vat: String,

    #[validate(range(min = 0.0, max = 100.0, message = "pct must be between 0 and 100"))]
    pub pct: f64,

    pub commentary: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub status: BillStatus,
}

/// Result of an attachment upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub file_url: String,

    /// Id of the bill created along with the upload
    pub key: String,
}
