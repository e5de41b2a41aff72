//! Contract handlers

use super::types::ContractRequest;
use crate::error::{ApiError, ApiResult};
use crate::models::Contract;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use proposal_auth::Identity;
use tracing::info;
use uuid::Uuid;

pub async fn create_contract(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(company_id): Path<Uuid>,
    Json(request): Json<ContractRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Name must not be empty".to_string()));
    }

    if state.db.find_company(company_id).await?.is_none() {
        return Err(ApiError::NotFound("Company not found".to_string()));
    }

    let contract = Contract::new(company_id, name.to_string(), identity.user_id);
    state.db.insert_contract(&contract).await?;

    info!(contract_id = %contract.id, company_id = %company_id, "Contract created");
    Ok((StatusCode::CREATED, Json(contract)))
}
