//! # Billed
//!
//! Client core of an employee expense-reporting application.
//!
//! ## Features
//!
//! - **Bills listing**: fetch every bill from the store and format dates for display
//! - **New bill submission**: attachment upload followed by a validated JSON submission
//! - **Store abstraction**: one trait per resource with `list`, `create` and `update`
//! - **Explicit session**: the logged-in owner is passed in, never read from globals
//! - **Backends**: in-memory store for tests, reqwest-based HTTP store (`http` feature)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use billed::prelude::*;
//!
//! let store = InMemoryStore::new();
//! let session = SessionContext::new("employee@test.tld");
//! let navigator: Arc<dyn Navigator> = Arc::new(|path: &str| println!("-> {}", path));
//!
//! let form = NewBillForm::new(store.clone(), session, navigator.clone());
//! form.handle_file_selected(&[SelectedFile::new("ticket.png", "image/png", bytes)]).await?;
//! form.handle_submit(&fields).await?;
//!
//! let list = BillsList::new(store, navigator, Arc::new(|el: &PreviewElement| {
//!     println!("preview {:?}", el.bill_url());
//! }));
//! let bills = list.fetch_all().await?;
//! ```

pub mod config;
pub mod containers;
pub mod core;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        BillRecord, BillStatus, BilledError, CreatePayload, FieldError, FilePart, FormError,
        FormPart, FormatError, InMemorySessionStorage, MultipartForm, Navigator, NewBillPayload,
        ResourceStore, RoutesPath, SessionContext, SessionError, SessionStorage, Store,
        StoreError, UpdatePayload, UploadReceipt, UserType, ValidationError, format_date,
        format_status, try_format_date,
    };

    // === Containers ===
    pub use crate::containers::{
        Bindings, BillsList, FormFields, FormState, NewBillForm, PreviewElement,
        PreviewPresenter, SelectedFile, bind_each, sort_by_date,
    };

    // === Storage ===
    #[cfg(feature = "http")]
    pub use crate::storage::HttpStore;
    pub use crate::storage::{InMemoryResourceStore, InMemoryStore, StoreOperation};

    // === Config ===
    pub use crate::config::{ApiConfig, BilledConfig, UploadConfig};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
