//! Wiring of the auth components from settings and stores

use crate::access::AccessController;
use crate::accounts::AccountService;
use crate::credentials::CredentialHasher;
use crate::error::{AuthResult, InfraError};
use crate::issuer::SessionIssuer;
use crate::jwt::TokenCodec;
use crate::route::RouteList;
use crate::store::{CredentialStore, PermissionStore, SessionStore};
use crate::validator::SessionValidator;
use proposal_core::{AuthSettings, MAX_SESSION_TTL_MINUTES};
use std::sync::Arc;

/// Stores the auth core reads and writes through
#[derive(Clone)]
pub struct AuthStores {
    pub credentials: Arc<dyn CredentialStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub permissions: Arc<dyn PermissionStore>,
}

impl AuthStores {
    /// One backend serving all three roles
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: CredentialStore + SessionStore + PermissionStore + 'static,
    {
        Self {
            credentials: store.clone(),
            sessions: store.clone(),
            permissions: store,
        }
    }
}

/// Route lists consulted by the request pipeline
#[derive(Debug, Clone, Default)]
pub struct RouteRules {
    /// Skip authentication and authorization
    pub bypass: RouteList,
    /// Require a session but no permission grant
    pub authenticated_only: RouteList,
}

pub struct AuthService {
    pub issuer: SessionIssuer,
    pub validator: SessionValidator,
    pub access: AccessController,
    pub accounts: AccountService,
    pub permissions: Arc<dyn PermissionStore>,
}

impl AuthService {
    pub fn new(settings: &AuthSettings, stores: AuthStores, rules: RouteRules) -> AuthResult<Self> {
        let ttl = settings.session_ttl().ok_or_else(|| {
            InfraError::Config(format!(
                "session TTL must be between 1 and {MAX_SESSION_TTL_MINUTES} minutes, got {}",
                settings.session_ttl_minutes
            ))
        })?;
        let codec = Arc::new(TokenCodec::from_settings(settings));
        let hasher = CredentialHasher::new(&settings.password_hash)?;

        Ok(Self {
            issuer: SessionIssuer::new(
                stores.credentials.clone(),
                stores.sessions.clone(),
                codec.clone(),
                hasher.clone(),
                ttl,
            ),
            validator: SessionValidator::new(codec, stores.sessions.clone(), rules.bypass),
            access: AccessController::new(stores.permissions.clone(), rules.authenticated_only),
            accounts: AccountService::new(stores.credentials, stores.sessions, hasher),
            permissions: stores.permissions,
        })
    }
}
