//! In-memory store, for tests and for embedding the core without a database

use crate::credentials::Credential;
use crate::error::StoreError;
use crate::permissions::{Permission, Role};
use crate::session::Session;
use crate::store::{CredentialStore, PermissionStore, SessionStore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    credentials: RwLock<HashMap<String, Credential>>,
    /// Deactivated credentials by lookup key
    retired: RwLock<HashMap<String, Credential>>,
    sessions: RwLock<HashMap<Uuid, Session>>,
    permissions: RwLock<Vec<Permission>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Overwrite a stored session, bypassing the insert-once rule
    pub async fn replace_session(&self, session: Session) {
        self.sessions.write().await.insert(session.id, session);
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_lookup_key(&self, lookup_key_hash: &str) -> StoreResult<Option<Credential>> {
        Ok(self.credentials.read().await.get(lookup_key_hash).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> StoreResult<Option<Credential>> {
        let credentials = self.credentials.read().await;
        Ok(credentials.values().find(|c| c.user_id == user_id).cloned())
    }

    async fn insert_credential(&self, credential: &Credential) -> StoreResult<()> {
        let mut credentials = self.credentials.write().await;
        let retired = self.retired.read().await;
        if credentials.contains_key(&credential.lookup_key_hash)
            || retired.contains_key(&credential.lookup_key_hash)
        {
            return Err(StoreError::Conflict("credential already exists".to_string()));
        }
        credentials.insert(credential.lookup_key_hash.clone(), credential.clone());
        Ok(())
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> StoreResult<()> {
        let mut credentials = self.credentials.write().await;
        let credential = credentials
            .values_mut()
            .find(|c| c.user_id == user_id)
            .ok_or_else(|| StoreError::NotFound(format!("credential for user {user_id}")))?;
        credential.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn deactivate_credential(&self, user_id: Uuid) -> StoreResult<()> {
        let mut credentials = self.credentials.write().await;
        let key = credentials
            .iter()
            .find(|(_, c)| c.user_id == user_id)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| StoreError::NotFound(format!("credential for user {user_id}")))?;

        if let Some(credential) = credentials.remove(&key) {
            self.retired.write().await.insert(key, credential);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, session: &Session) -> StoreResult<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(StoreError::Conflict(format!("session {}", session.id)));
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: Uuid) -> StoreResult<Option<Session>> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn delete_session(&self, session_id: Uuid) -> StoreResult<()> {
        self.sessions.write().await.remove(&session_id);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_sessions_for_user(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }
}

#[async_trait]
impl PermissionStore for MemoryStore {
    async fn permissions_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Permission>> {
        let permissions = self.permissions.read().await;
        Ok(permissions
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn permissions_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Permission>> {
        let permissions = self.permissions.read().await;
        Ok(permissions
            .iter()
            .filter(|p| p.company_id == Some(company_id))
            .cloned()
            .collect())
    }

    async fn find_permission(&self, permission_id: Uuid) -> StoreResult<Option<Permission>> {
        let permissions = self.permissions.read().await;
        Ok(permissions.iter().find(|p| p.id == permission_id).cloned())
    }

    async fn insert_permission(&self, permission: &Permission) -> StoreResult<()> {
        let mut permissions = self.permissions.write().await;
        if permissions.iter().any(|p| p.id == permission.id) {
            return Err(StoreError::Conflict(format!("permission {}", permission.id)));
        }
        permissions.push(permission.clone());
        Ok(())
    }

    async fn update_permission(
        &self,
        permission_id: Uuid,
        role: Role,
        contract_id: Option<Uuid>,
    ) -> StoreResult<Permission> {
        let mut permissions = self.permissions.write().await;
        let permission = permissions
            .iter_mut()
            .find(|p| p.id == permission_id)
            .ok_or_else(|| StoreError::NotFound(format!("permission {permission_id}")))?;
        permission.role = role;
        permission.contract_id = contract_id;
        Ok(permission.clone())
    }

    async fn delete_permission(&self, permission_id: Uuid) -> StoreResult<()> {
        let mut permissions = self.permissions.write().await;
        let before = permissions.len();
        permissions.retain(|p| p.id != permission_id);
        if permissions.len() == before {
            return Err(StoreError::NotFound(format!("permission {permission_id}")));
        }
        Ok(())
    }
}
