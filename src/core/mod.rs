//! Core module containing the bill model, store traits and shared helpers

pub mod bill;
pub mod error;
pub mod format;
pub mod routes;
pub mod session;
pub mod store;

pub use bill::{BillRecord, BillStatus, NewBillPayload, UploadReceipt};
pub use error::{
    BilledError, FieldError, FormError, FormatError, SessionError, StoreError, ValidationError,
};
pub use format::{format_date, format_status, try_format_date};
pub use routes::{Navigator, RoutesPath};
pub use session::{InMemorySessionStorage, SessionContext, SessionStorage, UserType};
pub use store::{
    CreatePayload, FilePart, FormPart, MultipartForm, ResourceStore, Store, UpdatePayload,
};
