//! Accounts: invitation, login, password change, logout and user management

use super::types::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest, UserListResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use proposal_auth::{policy, AccountError, AuthError, Identity, StoreError};
use tracing::{info, warn};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;

fn validate_email(email: &str) -> ApiResult<()> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(ApiError::Validation("Not a valid email".to_string()));
    }
    Ok(())
}

fn validate_new_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

async fn caller_is_admin(state: &AppState, identity: &Identity) -> ApiResult<bool> {
    let permissions = state.auth.access.permissions_for(identity).await?;
    Ok(policy::is_admin(&permissions))
}

/// Callers may act on their own account; only admins on anyone else's
async fn ensure_self_or_admin(state: &AppState, identity: &Identity, user_id: Uuid) -> ApiResult<()> {
    if identity.user_id == user_id || caller_is_admin(state, identity).await? {
        return Ok(());
    }
    warn!(user_id = %identity.user_id, target = %user_id, "Refused access to another account");
    Err(AuthError::Unauthorized.into())
}

/// Create an account on behalf of the signed-in caller
pub async fn register(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&request.email)?;
    validate_new_password(&request.password)?;

    let credential = state
        .auth
        .accounts
        .prepare_credential(&request.email, &request.password)
        .await?;
    let user = User::new(credential.user_id, request.profile, Some(identity.user_id));

    state
        .db
        .create_user(&user, &credential, &[])
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => ApiError::from(AccountError::EmailTaken),
            other => other.into(),
        })?;

    info!(user_id = %user.id, invited_by = %identity.user_id, "User invited");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<UserListResponse>> {
    if !caller_is_admin(&state, &identity).await? {
        warn!(user_id = %identity.user_id, "Non-admin tried to list users");
        return Err(AuthError::Unauthorized.into());
    }

    let users = state.db.list_users().await?;
    Ok(Json(UserListResponse {
        total: users.len(),
        users,
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    ensure_self_or_admin(&state, &identity, user_id).await?;
    state
        .db
        .find_user(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Deactivate an account and end all of its sessions
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ensure_self_or_admin(&state, &identity, user_id).await?;
    state.auth.accounts.deactivate(user_id).await?;

    info!(user_id = %user_id, deleted_by = %identity.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let issued = state
        .auth
        .issuer
        .create_session(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        expires_at: issued.expires_at().timestamp_millis(),
        access_token: issued.access_token,
    }))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    validate_new_password(&request.new_password)?;

    state
        .auth
        .accounts
        .change_password(&identity, &request.current_password, &request.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<StatusCode> {
    state.auth.issuer.end_session(&identity).await?;
    Ok(StatusCode::NO_CONTENT)
}
