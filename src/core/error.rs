//! Typed error handling for the billed client
//!
//! Errors are grouped by where they originate so callers can match on the
//! category they care about instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`StoreError`]: a store call failed (network, HTTP status, decoding).
//!   These are propagated verbatim, never retried.
//! - [`FormatError`]: a display value could not be produced. Recovered
//!   locally by the formatters, only surfaced by the `try_*` variants.
//! - [`ValidationError`]: form input is missing or malformed.
//! - [`SessionError`]: the persisted session entry is missing or unreadable.
//! - [`FormError`]: everything the new bill form can fail with.
//!
//! # Example
//!
//! ```rust,ignore
//! match form.handle_submit(&fields).await {
//!     Ok(bill) => println!("submitted {}", bill.id),
//!     Err(FormError::Validation(ValidationError::InvalidNumber { field, .. })) => {
//!         println!("please fix {}", field);
//!     }
//!     Err(e) => eprintln!("submission failed: {}", e),
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// The umbrella error type of the crate
///
/// Each variant wraps the error of one category. Conversions exist from every
/// category so `?` works across module boundaries.
#[derive(Debug, Error)]
pub enum BilledError {
    /// Store call failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Display formatting failed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Input validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Session state is unusable
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Form is busy with another operation
    #[error("{0}")]
    Busy(String),
}

impl BilledError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            BilledError::Store(e) => e.error_code(),
            BilledError::Format(_) => "FORMAT_ERROR",
            BilledError::Validation(_) => "VALIDATION_ERROR",
            BilledError::Session(_) => "SESSION_ERROR",
            BilledError::Busy(_) => "FORM_BUSY",
        }
    }
}

impl From<FormError> for BilledError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Store(e) => BilledError::Store(e),
            FormError::Validation(e) => BilledError::Validation(e),
            busy @ FormError::Busy { .. } => BilledError::Busy(busy.to_string()),
        }
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors returned by a store call
///
/// `Clone` and `PartialEq` so a caller can check it received exactly the
/// failure the store produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The request never produced a response
    #[error("Transport error during {operation} on '{resource}': {message}")]
    Transport {
        resource: String,
        operation: String,
        message: String,
    },

    /// The backend answered with a non-success status
    #[error("'{resource}' request failed with status {status}: {message}")]
    Status {
        resource: String,
        status: u16,
        message: String,
    },

    /// The targeted record does not exist
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: String },

    /// The response body could not be decoded
    #[error("Failed to decode '{resource}' response: {message}")]
    Decode { resource: String, message: String },

    /// The store rejected the call with a plain reason
    #[error("{0}")]
    Rejected(String),
}

impl StoreError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Transport { .. } => "STORE_TRANSPORT_ERROR",
            StoreError::Status { .. } => "STORE_STATUS_ERROR",
            StoreError::NotFound { .. } => "STORE_NOT_FOUND",
            StoreError::Decode { .. } => "STORE_DECODE_ERROR",
            StoreError::Rejected(_) => "STORE_REJECTED",
        }
    }

    /// Shorthand for a rejection carrying only a message
    pub fn rejected(message: impl Into<String>) -> Self {
        StoreError::Rejected(message.into())
    }
}

// =============================================================================
// Format Errors
// =============================================================================

/// Errors produced while building display values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("Invalid date '{raw}': {reason}")]
    InvalidDate { raw: String, reason: String },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Errors related to form input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field was left empty
    #[error("Field '{field}' is required")]
    MissingField { field: String },

    /// A numeric field could not be parsed
    #[error("Field '{field}' is not a valid number: '{value}'")]
    InvalidNumber { field: String, value: String },

    /// The selected attachment has an extension that is not accepted
    #[error("Unsupported attachment '{file_name}', expected one of: {accepted}")]
    UnsupportedFile { file_name: String, accepted: String },

    /// Several fields failed declarative checks
    #[error("Validation failed on {} field(s)", .0.len())]
    FieldErrors(Vec<FieldError>),
}

impl ValidationError {
    /// Name of the first offending field, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingField { field } => Some(field),
            ValidationError::InvalidNumber { field, .. } => Some(field),
            ValidationError::UnsupportedFile { .. } => Some("file"),
            ValidationError::FieldErrors(errors) => errors.first().map(|e| e.field.as_str()),
        }
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| FieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

// =============================================================================
// Session Errors
// =============================================================================

/// Errors related to the persisted session entry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("No session entry under key '{key}'")]
    Missing { key: String },

    #[error("Malformed session entry under key '{key}': {message}")]
    Malformed { key: String, message: String },
}

// =============================================================================
// Form Errors
// =============================================================================

/// Errors surfaced by the new bill form handlers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another upload or submission is still in flight
    #[error("Cannot start {operation} while the form is {state}")]
    Busy {
        operation: &'static str,
        state: &'static str,
    },
}
