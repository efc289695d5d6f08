//! Store traits for remote bill resources
//!
//! A [`Store`] hands out one [`ResourceStore`] per resource name. The
//! resource store exposes the three capabilities the containers rely on:
//! `list`, `create` (multipart, used for attachment upload) and `update`
//! (JSON, used for bill submission).

use crate::core::bill::{BillRecord, UploadReceipt};
use crate::core::error::StoreError;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;

/// Header telling the transport not to force a JSON content type
pub const NO_CONTENT_TYPE_HEADER: &str = "noContentType";

/// Opaque file attached to a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// One named part of a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text(String),
    File(FilePart),
}

/// Ordered multipart form body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<(String, FormPart)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text part
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormPart::Text(value.into())));
        self
    }

    /// Append a file part
    pub fn file(mut self, name: impl Into<String>, file: FilePart) -> Self {
        self.parts.push((name.into(), FormPart::File(file)));
        self
    }

    /// First text value stored under `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(n, part)| match part {
            FormPart::Text(value) if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// First file stored under `name`
    pub fn get_file(&self, name: &str) -> Option<&FilePart> {
        self.parts.iter().find_map(|(n, part)| match part {
            FormPart::File(file) if n == name => Some(file),
            _ => None,
        })
    }

    pub fn parts(&self) -> &[(String, FormPart)] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Argument of [`ResourceStore::create`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatePayload {
    pub data: MultipartForm,
    pub headers: IndexMap<String, String>,
}

impl CreatePayload {
    pub fn new(data: MultipartForm) -> Self {
        Self {
            data,
            headers: IndexMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Whether the caller asked the transport to leave the content type alone
    pub fn no_content_type(&self) -> bool {
        self.headers
            .get(NO_CONTENT_TYPE_HEADER)
            .is_some_and(|v| v == "true")
    }
}

/// Argument of [`ResourceStore::update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePayload {
    /// JSON-encoded record
    pub data: String,

    /// Id of the record to update
    pub selector: Option<String>,
}

/// CRUD-style operations on a single remote resource
///
/// Every call is a single request: implementations must not cache or
/// deduplicate, and failures are returned as-is.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Name of the resource ("bills")
    fn resource(&self) -> &str;

    /// List all records
    async fn list(&self) -> Result<Vec<BillRecord>, StoreError>;

    /// Create a record from a multipart form
    async fn create(&self, payload: CreatePayload) -> Result<UploadReceipt, StoreError>;

    /// Update a record from a JSON body
    async fn update(&self, payload: UpdatePayload) -> Result<BillRecord, StoreError>;
}

/// Remote store handing out resource accessors
pub trait Store: Send + Sync {
    /// Accessor for the resource named `name`
    fn resource(&self, name: &str) -> Arc<dyn ResourceStore>;

    /// Accessor for the bills resource
    fn bills(&self) -> Arc<dyn ResourceStore> {
        self.resource("bills")
    }
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn resource(&self, name: &str) -> Arc<dyn ResourceStore> {
        (**self).resource(name)
    }

    fn bills(&self) -> Arc<dyn ResourceStore> {
        (**self).bills()
    }
}
