//! Registration, password rotation and account removal

use crate::credentials::{hash_lookup_key, Credential, CredentialHasher};
use crate::error::{AuthError, StoreError};
use crate::session::Identity;
use crate::store::{CredentialStore, SessionStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("no such account")]
    UnknownAccount,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        AccountError::Auth(err.into())
    }
}

pub type AccountResult<T> = Result<T, AccountError>;

pub struct AccountService {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: CredentialHasher,
}

impl AccountService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            credentials,
            sessions,
            hasher,
        }
    }

    /// Hash a new user's credential without storing it, for callers that
    /// persist it together with other records.
    ///
    /// The email check here is advisory; the store's unique lookup key is
    /// what decides.
    pub async fn prepare_credential(&self, email: &str, password: &str) -> AccountResult<Credential> {
        let lookup_key = hash_lookup_key(email);
        if self.credentials.find_by_lookup_key(&lookup_key).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = self
            .hasher
            .hash_password_async(password.to_string())
            .await?;

        Ok(Credential {
            user_id: Uuid::new_v4(),
            lookup_key_hash: lookup_key,
            password_hash,
        })
    }

    /// Create a credential for a new user
    pub async fn register(&self, email: &str, password: &str) -> AccountResult<Uuid> {
        let credential = self.prepare_credential(email, password).await?;

        // A concurrent registration can still win between lookup and insert.
        match self.credentials.insert_credential(&credential).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(AccountError::EmailTaken),
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %credential.user_id, "User registered");
        Ok(credential.user_id)
    }

    /// Replace the caller's password after checking the current one.
    ///
    /// Sessions already issued stay valid until they expire.
    pub async fn change_password(
        &self,
        identity: &Identity,
        current_password: &str,
        new_password: &str,
    ) -> AccountResult<()> {
        let credential = self
            .credentials
            .find_by_user_id(identity.user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let verified = self
            .hasher
            .verify_password_async(credential.password_hash, current_password.to_string())
            .await?;
        if !verified {
            warn!(user_id = %identity.user_id, "Password change rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        let password_hash = self
            .hasher
            .hash_password_async(new_password.to_string())
            .await?;
        self.credentials
            .update_password_hash(identity.user_id, &password_hash)
            .await?;

        info!(user_id = %identity.user_id, "Password changed");
        Ok(())
    }

    /// Deactivate a user's credential and end all of their sessions.
    ///
    /// The email stays reserved, so it cannot be registered again.
    pub async fn deactivate(&self, user_id: Uuid) -> AccountResult<()> {
        match self.credentials.deactivate_credential(user_id).await {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => return Err(AccountError::UnknownAccount),
            Err(e) => return Err(e.into()),
        }

        let ended = self.sessions.delete_sessions_for_user(user_id).await?;
        info!(user_id = %user_id, sessions_ended = ended, "User deactivated");
        Ok(())
    }
}
