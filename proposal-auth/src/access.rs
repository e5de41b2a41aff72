//! Per-request authorization: load the caller's grants, then apply the policy

use crate::error::{AuthError, AuthResult};
use crate::permissions::Permission;
use crate::policy;
use crate::route::{Method, RouteList};
use crate::session::Identity;
use crate::store::PermissionStore;
use std::sync::Arc;
use tracing::error;

pub struct AccessController {
    permissions: Arc<dyn PermissionStore>,
    authenticated_only: RouteList,
}

impl AccessController {
    /// `authenticated_only` lists routes that need a valid session but no grant
    pub fn new(permissions: Arc<dyn PermissionStore>, authenticated_only: RouteList) -> Self {
        Self {
            permissions,
            authenticated_only,
        }
    }

    pub fn requires_permission(&self, method: Method, path: &str) -> bool {
        !self.authenticated_only.contains(method, path)
    }

    pub async fn permissions_for(&self, identity: &Identity) -> AuthResult<Vec<Permission>> {
        self.permissions
            .permissions_for_user(identity.user_id)
            .await
            .map_err(|e| {
                error!(user_id = %identity.user_id, error = %e, "Failed to load permissions");
                AuthError::from(e)
            })
    }

    /// Allow or deny `method` on `path` for `identity`
    pub async fn authorize_request(
        &self,
        method: Method,
        identity: &Identity,
        path: &str,
    ) -> AuthResult<()> {
        if !self.requires_permission(method, path) {
            return Ok(());
        }

        let permissions = self.permissions_for(identity).await?;
        policy::authorize(method, identity, &permissions, path)
    }
}
