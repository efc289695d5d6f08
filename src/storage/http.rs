//! HTTP implementation of Store backed by reqwest
//!
//! Wire contract, relative to the configured base URL:
//!
//! - `list`   → `GET /{resource}`
//! - `create` → `POST /{resource}` with a multipart body
//! - `update` → `PATCH /{resource}/{selector}` with a JSON body, or
//!   `POST /{resource}` when no selector is given
//!
//! Requests carry `Authorization: Bearer <jwt>` when a token is configured.
//! Non-success statuses become [`StoreError::Status`] with the `message`
//! field of the JSON error body when there is one.

use crate::config::ApiConfig;
use crate::core::bill::{BillRecord, UploadReceipt};
use crate::core::error::StoreError;
use crate::core::store::{
    CreatePayload, FormPart, NO_CONTENT_TYPE_HEADER, ResourceStore, Store, UpdatePayload,
};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// Store talking to the billing REST API
#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
    jwt: Option<String>,
}

impl HttpStore {
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Use a preconfigured reqwest client (timeouts, proxies, ...)
    pub fn with_client(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            jwt: config.jwt.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Store for HttpStore {
    fn resource(&self, name: &str) -> Arc<dyn ResourceStore> {
        Arc::new(HttpResourceStore {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            jwt: self.jwt.clone(),
            name: name.to_string(),
        })
    }
}

/// One REST resource (`/bills`)
struct HttpResourceStore {
    client: Client,
    base_url: String,
    jwt: Option<String>,
    name: String,
}

impl HttpResourceStore {
    fn url(&self, selector: Option<&str>) -> String {
        match selector {
            Some(selector) => format!("{}/{}/{}", self.base_url, self.name, selector),
            None => format!("{}/{}", self.base_url, self.name),
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.jwt {
            Some(jwt) => builder.header(AUTHORIZATION, format!("Bearer {}", jwt)),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        builder: RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = builder.send().await.map_err(|e| StoreError::Transport {
            resource: self.name.clone(),
            operation: operation.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| {
                    if body.is_empty() {
                        status.canonical_reason().unwrap_or("").to_string()
                    } else {
                        body
                    }
                });

            warn!(resource = %self.name, operation, status = status.as_u16(), %message, "store call failed");
            return Err(StoreError::Status {
                resource: self.name.clone(),
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| StoreError::Decode {
            resource: self.name.clone(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ResourceStore for HttpResourceStore {
    fn resource(&self) -> &str {
        &self.name
    }

    async fn list(&self) -> Result<Vec<BillRecord>, StoreError> {
        let url = self.url(None);
        debug!(%url, "GET");
        self.send("list", self.request(Method::GET, &url)).await
    }

    async fn create(&self, payload: CreatePayload) -> Result<UploadReceipt, StoreError> {
        let mut form = Form::new();
        for (name, part) in payload.data.parts() {
            form = match part {
                FormPart::Text(value) => form.text(name.clone(), value.clone()),
                FormPart::File(file) => {
                    let part =
                        Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                    // Browsers report "" for unknown types: keep reqwest's default then.
                    let part = if file.mime.trim().is_empty() {
                        part
                    } else {
                        part.mime_str(&file.mime).map_err(|_| {
                            StoreError::rejected(format!(
                                "Invalid MIME type '{}' for '{}'",
                                file.mime, file.file_name
                            ))
                        })?
                    };
                    form.part(name.clone(), part)
                }
            };
        }

        let url = self.url(None);
        debug!(%url, parts = payload.data.len(), "POST multipart");

        let mut builder = self.request(Method::POST, &url).multipart(form);
        for (name, value) in &payload.headers {
            if name != NO_CONTENT_TYPE_HEADER {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        self.send("create", builder).await
    }

    async fn update(&self, payload: UpdatePayload) -> Result<BillRecord, StoreError> {
        let (method, url) = match payload.selector.as_deref() {
            Some(selector) => (Method::PATCH, self.url(Some(selector))),
            None => (Method::POST, self.url(None)),
        };
        debug!(%method, %url, "JSON update");

        let builder = self
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.data);

        self.send("update", builder).await
    }
}
