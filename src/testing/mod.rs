//! In-memory collaborators for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::auth::Credential;
use crate::identity::{AuthUser, IdentityError, IdentityProvider, UserId};
use crate::store::{Collection, DataStore, StoreError};

/// Records every delete call; fails the tables it was told to
#[derive(Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<(String, String)>>,
    failing: HashSet<&'static str>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(tables: &[&'static str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: tables.iter().copied().collect(),
        }
    }

    /// `(table, owner)` pairs in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tables(&self) -> Vec<String> {
        self.calls().into_iter().map(|(table, _)| table).collect()
    }
}

#[async_trait]
impl DataStore for RecordingStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn delete_rows_by_owner(&self, collection: &Collection, owner: &UserId) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push((collection.table.to_string(), owner.to_string()));

        if self.failing.contains(collection.table) {
            return Err(StoreError::Api {
                status: 500,
                message: format!("cannot delete from {}", collection.table),
            });
        }
        Ok(())
    }
}

/// Store whose every call panics
pub struct PanickingStore;

#[async_trait]
impl DataStore for PanickingStore {
    fn backend(&self) -> &'static str {
        "panicking"
    }

    async fn delete_rows_by_owner(&self, _collection: &Collection, _owner: &UserId) -> Result<(), StoreError> {
        panic!("store connection poisoned");
    }
}

/// Token -> user map; deleting an identity revokes its tokens
#[derive(Default)]
pub struct FakeIdentity {
    sessions: Mutex<HashMap<String, UserId>>,
    deleted: Mutex<Vec<UserId>>,
    resolve_calls: Mutex<usize>,
    delete_error: Option<String>,
}

impl FakeIdentity {
    pub fn with_session(token: &str, user_id: &str) -> Self {
        let identity = Self::default();
        identity
            .sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), UserId::from(user_id));
        identity
    }

    pub fn failing_deletes(mut self, detail: &str) -> Self {
        self.delete_error = Some(detail.to_string());
        self
    }

    pub fn deleted(&self) -> Vec<UserId> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn resolve_calls(&self) -> usize {
        *self.resolve_calls.lock().unwrap()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn resolve_caller(&self, credential: &Credential) -> Result<AuthUser, IdentityError> {
        *self.resolve_calls.lock().unwrap() += 1;

        let sessions = self.sessions.lock().unwrap();
        match sessions.get(credential.token()) {
            Some(id) => Ok(AuthUser {
                id: id.clone(),
                email: None,
                role: Some("authenticated".to_string()),
            }),
            None => Err(IdentityError::Provider {
                status: 401,
                message: "invalid JWT".to_string(),
            }),
        }
    }

    async fn delete_identity(&self, user_id: &UserId) -> Result<(), IdentityError> {
        if let Some(detail) = &self.delete_error {
            return Err(IdentityError::Provider {
                status: 500,
                message: detail.clone(),
            });
        }

        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, id| id != user_id);
        if sessions.len() == before {
            return Err(IdentityError::Provider {
                status: 404,
                message: "User not found".to_string(),
            });
        }

        self.deleted.lock().unwrap().push(user_id.clone());
        Ok(())
    }
}
