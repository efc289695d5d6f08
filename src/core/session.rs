//! Session context of the logged-in user
//!
//! The session is persisted as a JSON object under the `"user"` key of a
//! key-value storage (browser localStorage in the web client). Containers
//! never read that storage themselves: a [`SessionContext`] is loaded once
//! and passed in explicitly.

use crate::core::error::SessionError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Storage key holding the serialized session
pub const SESSION_KEY: &str = "user";

/// Key-value storage holding persisted client state
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// In-memory [`SessionStorage`], the test double for localStorage
#[derive(Clone, Default)]
pub struct InMemorySessionStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for InMemorySessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .ok()
            .and_then(|items| items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Ok(mut items) = self.items.write() {
            items.insert(key.to_string(), value.to_string());
        }
    }

    fn remove_item(&self, key: &str) {
        if let Ok(mut items) = self.items.write() {
            items.remove(key);
        }
    }
}

/// Kind of account behind the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UserType {
    #[default]
    Employee,
    Admin,
}

/// Identity of the session owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub email: String,

    #[serde(rename = "type", default)]
    pub user_type: UserType,
}

impl SessionContext {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            user_type: UserType::Employee,
        }
    }

    pub fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        self
    }

    /// Read the session persisted under [`SESSION_KEY`]
    pub fn load(storage: &dyn SessionStorage) -> Result<Self, SessionError> {
        let raw = storage
            .get_item(SESSION_KEY)
            .ok_or_else(|| SessionError::Missing {
                key: SESSION_KEY.to_string(),
            })?;

        serde_json::from_str(&raw).map_err(|e| SessionError::Malformed {
            key: SESSION_KEY.to_string(),
            message: e.to_string(),
        })
    }

    /// Persist this session under [`SESSION_KEY`]
    pub fn save(&self, storage: &dyn SessionStorage) -> Result<(), SessionError> {
        let raw = serde_json::to_string(self).map_err(|e| SessionError::Malformed {
            key: SESSION_KEY.to_string(),
            message: e.to_string(),
        })?;
        storage.set_item(SESSION_KEY, &raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_session() {
        let storage = InMemorySessionStorage::new();
        storage.set_item(SESSION_KEY, r#"{"email" : "user@email.com"}"#);

        let session = SessionContext::load(&storage).unwrap();
        assert_eq!(session.email, "user@email.com");
        assert_eq!(session.user_type, UserType::Employee);
    }

    #[test]
    fn test_load_session_with_type() {
        let storage = InMemorySessionStorage::new();
        storage.set_item(
            SESSION_KEY,
            r#"{"type": "Admin", "email": "admin@test.tld"}"#,
        );

        let session = SessionContext::load(&storage).unwrap();
        assert_eq!(session.user_type, UserType::Admin);
    }

    #[test]
    fn test_missing_session() {
        let storage = InMemorySessionStorage::new();
        let err = SessionContext::load(&storage).unwrap_err();
        assert_eq!(
            err,
            SessionError::Missing {
                key: "user".to_string()
            }
        );
    }

    #[test]
    fn test_session_without_email_is_malformed() {
        let storage = InMemorySessionStorage::new();
        storage.set_item(SESSION_KEY, r#"{"type": "Employee"}"#);

        let err = SessionContext::load(&storage).unwrap_err();
        assert!(matches!(err, SessionError::Malformed { .. }));
    }

    #[test]
    fn test_save_then_remove() {
        let storage = InMemorySessionStorage::new();
        SessionContext::new("employee@test.tld")
            .save(&storage)
            .unwrap();
        assert_eq!(
            SessionContext::load(&storage).unwrap().email,
            "employee@test.tld"
        );

        storage.remove_item(SESSION_KEY);
        assert!(storage.get_item(SESSION_KEY).is_none());
    }
}
