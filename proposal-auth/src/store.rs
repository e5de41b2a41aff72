//! Store interfaces consumed by the auth core
//!
//! Implementations must be safe to share between concurrent requests. Retries,
//! if any, belong in the implementation.

use crate::credentials::Credential;
use crate::error::StoreError;
use crate::permissions::{Permission, Role};
use crate::session::Session;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Credential lookup and maintenance.
///
/// Deactivated credentials are invisible to both finders but keep their
/// lookup key reserved.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find an active credential by its email lookup key
    async fn find_by_lookup_key(&self, lookup_key_hash: &str) -> StoreResult<Option<Credential>>;

    async fn find_by_user_id(&self, user_id: Uuid) -> StoreResult<Option<Credential>>;

    /// Insert a new credential; a taken lookup key is a [`StoreError::Conflict`]
    async fn insert_credential(&self, credential: &Credential) -> StoreResult<()>;

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> StoreResult<()>;

    /// Soft-delete; an unknown or already deactivated user is a [`StoreError::NotFound`]
    async fn deactivate_credential(&self, user_id: Uuid) -> StoreResult<()>;
}

/// Durable session records keyed by session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: &Session) -> StoreResult<()>;

    async fn find_session(&self, session_id: Uuid) -> StoreResult<Option<Session>>;

    /// Delete a session; deleting an unknown id is not an error
    async fn delete_session(&self, session_id: Uuid) -> StoreResult<()>;

    /// Remove sessions that expired before `now`, returning how many went
    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64>;

    async fn delete_sessions_for_user(&self, user_id: Uuid) -> StoreResult<u64>;
}

/// Permission grants
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn permissions_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Permission>>;

    async fn permissions_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Permission>>;

    async fn find_permission(&self, permission_id: Uuid) -> StoreResult<Option<Permission>>;

    async fn insert_permission(&self, permission: &Permission) -> StoreResult<()>;

    /// Change role and contract scope; an unknown id is a [`StoreError::NotFound`]
    async fn update_permission(
        &self,
        permission_id: Uuid,
        role: Role,
        contract_id: Option<Uuid>,
    ) -> StoreResult<Permission>;

    /// Delete a grant; an unknown id is a [`StoreError::NotFound`]
    async fn delete_permission(&self, permission_id: Uuid) -> StoreResult<()>;
}
