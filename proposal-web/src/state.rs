//! Shared application state

use crate::db::SqliteStore;
use crate::models::{User, UserProfile};
use crate::routes;
use crate::{WebError, WebResult};
use proposal_auth::{AccountError, AuthService, AuthStores, Permission, Role, StoreError};
use proposal_core::Settings;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub auth: Arc<AuthService>,
    pub db: Arc<SqliteStore>,
}

impl AppState {
    /// Connect the database, wire the auth components and seed the
    /// bootstrap user if one is configured
    pub async fn new(settings: Settings) -> WebResult<Self> {
        let db = SqliteStore::connect(&settings.database)
            .await
            .map_err(|e| WebError::Database(e.to_string()))?;

        let state = Self::from_parts(settings, Arc::new(db))?;
        state.seed_bootstrap_user().await?;
        Ok(state)
    }

    pub fn from_parts(settings: Settings, db: Arc<SqliteStore>) -> WebResult<Self> {
        let auth = AuthService::new(
            &settings.auth,
            AuthStores::shared(db.clone()),
            routes::route_rules(),
        )
        .map_err(|e| WebError::Config(e.to_string()))?;

        Ok(Self {
            settings: Arc::new(settings),
            auth: Arc::new(auth),
            db,
        })
    }

    /// Create the configured first account, holding the global `admin` role,
    /// unless its email is already taken.
    ///
    /// It is the only account created without an inviter.
    pub async fn seed_bootstrap_user(&self) -> WebResult<()> {
        let Some(bootstrap) = &self.settings.auth.bootstrap_user else {
            return Ok(());
        };

        let credential = match self
            .auth
            .accounts
            .prepare_credential(&bootstrap.email, &bootstrap.password)
            .await
        {
            Ok(credential) => credential,
            Err(AccountError::EmailTaken) => {
                debug!("Bootstrap user already exists");
                return Ok(());
            }
            Err(e) => return Err(WebError::Database(e.to_string())),
        };

        let user = User::new(credential.user_id, UserProfile::default(), None);
        let admin = Permission::new(user.id, None, Role::Admin);
        match self.db.create_user(&user, &credential, &[admin]).await {
            Ok(()) => info!(user_id = %user.id, "Bootstrap user created"),
            // Deactivated, or created concurrently by another instance
            Err(StoreError::Conflict(_)) => debug!("Bootstrap user email is reserved"),
            Err(e) => return Err(WebError::Database(e.to_string())),
        }
        Ok(())
    }
}
