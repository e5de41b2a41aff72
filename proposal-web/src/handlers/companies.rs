//! Company handlers

use super::types::CompanyRequest;
use crate::error::{ApiError, ApiResult};
use crate::models::Company;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use proposal_auth::{Identity, Permission, Role};
use tracing::info;
use uuid::Uuid;

fn validate_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

/// Create a company; the creator is granted `admin` on it
pub async fn create_company(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CompanyRequest>,
) -> ApiResult<impl IntoResponse> {
    let company = Company::new(validate_name(&request.name)?, identity.user_id);
    let owner = Permission::new(identity.user_id, Some(company.id), Role::Admin);

    state.db.create_company(&company, &owner).await?;

    info!(company_id = %company.id, user_id = %identity.user_id, "Company created");
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Json<Company>> {
    state
        .db
        .find_company(company_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))
}

pub async fn update_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(request): Json<CompanyRequest>,
) -> ApiResult<Json<Company>> {
    let name = validate_name(&request.name)?;
    state
        .db
        .rename_company(company_id, &name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))
}

/// Delete a company with its grants, contracts and categories
pub async fn delete_company(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !state.db.delete_company(company_id).await? {
        return Err(ApiError::NotFound("Company not found".to_string()));
    }

    info!(company_id = %company_id, deleted_by = %identity.user_id, "Company deleted");
    Ok(StatusCode::NO_CONTENT)
}
