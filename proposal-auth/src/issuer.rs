//! Login: credential check, session persistence, token issuance

use crate::credentials::{hash_lookup_key, CredentialHasher};
use crate::error::{AuthError, AuthResult, InfraError};
use crate::jwt::TokenCodec;
use crate::session::{Identity, IssuedToken, Session};
use crate::store::{CredentialStore, SessionStore};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

pub struct SessionIssuer {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    codec: Arc<TokenCodec>,
    hasher: CredentialHasher,
    ttl: Duration,
}

impl SessionIssuer {
    /// `ttl` must be positive; [`proposal_core::AuthSettings::validate`] enforces this.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        codec: Arc<TokenCodec>,
        hasher: CredentialHasher,
        ttl: Duration,
    ) -> Self {
        Self {
            credentials,
            sessions,
            codec,
            hasher,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create_session(&self, email: &str, password: &str) -> AuthResult<IssuedToken> {
        self.create_session_at(email, password, Utc::now()).await
    }

    /// Verify credentials and issue a token for a session starting at `now`.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`]. The session is persisted before the
    /// token is produced.
    pub async fn create_session_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedToken> {
        let credential = match self
            .credentials
            .find_by_lookup_key(&hash_lookup_key(email))
            .await?
        {
            Some(credential) => credential,
            None => {
                // Pay the same argon2 cost as a wrong password would.
                self.hasher
                    .verify_password_async(
                        self.hasher.placeholder_hash().to_string(),
                        password.to_string(),
                    )
                    .await?;
                warn!("Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let verified = self
            .hasher
            .verify_password_async(credential.password_hash, password.to_string())
            .await?;
        if !verified {
            warn!(user_id = %credential.user_id, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session::start(credential.user_id, now, self.ttl).ok_or_else(|| {
            InfraError::Clock(format!("session expiry overflows: {now} + {}", self.ttl))
        })?;
        self.sessions.insert_session(&session).await?;

        let access_token = self.codec.encode(&session)?;

        info!(
            user_id = %session.user_id,
            session_id = %session.id,
            expires_at = %session.expires_at,
            "Session created"
        );

        Ok(IssuedToken {
            access_token,
            session,
        })
    }

    /// Drop the caller's session so its token stops validating
    pub async fn end_session(&self, identity: &Identity) -> AuthResult<()> {
        self.sessions.delete_session(identity.session_id).await?;
        info!(
            user_id = %identity.user_id,
            session_id = %identity.session_id,
            "Session ended"
        );
        Ok(())
    }
}
