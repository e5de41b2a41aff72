//! Permission management under a company

use super::types::{GrantPermissionRequest, PermissionListResponse, UpdatePermissionRequest};
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use proposal_auth::{policy, AuthError, Identity, Permission, PermissionStore, Role};
use tracing::{info, warn};
use uuid::Uuid;

/// `admin` is handed out by admins only; `company_admin` by admins or the
/// company's own company admins
async fn ensure_may_assign(
    state: &AppState,
    identity: &Identity,
    company_id: Uuid,
    role: Role,
) -> ApiResult<()> {
    if !matches!(role, Role::Admin | Role::CompanyAdmin) {
        return Ok(());
    }

    let permissions = state.auth.access.permissions_for(identity).await?;
    let allowed = policy::is_admin(&permissions)
        || (role == Role::CompanyAdmin
            && permissions
                .iter()
                .any(|p| p.grants(Role::CompanyAdmin, company_id)));

    if !allowed {
        warn!(user_id = %identity.user_id, %role, company_id = %company_id, "Refused role assignment");
        return Err(AuthError::Unauthorized.into());
    }
    Ok(())
}

/// Load a permission, treating one from another company as absent
async fn company_permission(
    state: &AppState,
    company_id: Uuid,
    permission_id: Uuid,
) -> ApiResult<Permission> {
    state
        .auth
        .permissions
        .find_permission(permission_id)
        .await?
        .filter(|permission| permission.company_id == Some(company_id))
        .ok_or_else(|| ApiError::NotFound("Permission not found".to_string()))
}

pub async fn grant_permission(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(company_id): Path<Uuid>,
    Json(request): Json<GrantPermissionRequest>,
) -> ApiResult<impl IntoResponse> {
    ensure_may_assign(&state, &identity, company_id, request.role).await?;

    if state.db.find_company(company_id).await?.is_none() {
        return Err(ApiError::NotFound("Company not found".to_string()));
    }

    let mut permission = Permission::new(request.user_id, Some(company_id), request.role);
    if let Some(contract_id) = request.contract_id {
        permission = permission.with_contract(contract_id);
    }
    state.auth.permissions.insert_permission(&permission).await?;

    info!(
        permission_id = %permission.id,
        company_id = %company_id,
        grantee = %permission.user_id,
        role = %permission.role,
        granted_by = %identity.user_id,
        "Permission granted"
    );
    Ok((StatusCode::CREATED, Json(permission)))
}

pub async fn list_permissions(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Json<PermissionListResponse>> {
    let permissions = state
        .auth
        .permissions
        .permissions_for_company(company_id)
        .await?;

    Ok(Json(PermissionListResponse {
        total: permissions.len(),
        permissions,
    }))
}

pub async fn update_permission(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((company_id, permission_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdatePermissionRequest>,
) -> ApiResult<Json<Permission>> {
    ensure_may_assign(&state, &identity, company_id, request.role).await?;
    company_permission(&state, company_id, permission_id).await?;

    let permission = state
        .auth
        .permissions
        .update_permission(permission_id, request.role, request.contract_id)
        .await?;

    info!(
        permission_id = %permission_id,
        role = %permission.role,
        updated_by = %identity.user_id,
        "Permission updated"
    );
    Ok(Json(permission))
}

pub async fn revoke_permission(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((company_id, permission_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    company_permission(&state, company_id, permission_id).await?;
    state
        .auth
        .permissions
        .delete_permission(permission_id)
        .await?;

    info!(permission_id = %permission_id, revoked_by = %identity.user_id, "Permission revoked");
    Ok(StatusCode::NO_CONTENT)
}
