//! Category handlers under a company

use super::types::{CategoryListResponse, CategoryRequest, UpdateCategoryRequest};
use crate::error::{ApiError, ApiResult};
use crate::models::Category;
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

fn required(field: &str, value: &str) -> ApiResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn category_not_found() -> ApiError {
    ApiError::NotFound("Category not found".to_string())
}

/// Create a category; a parent must be a top-level category of the same company
pub async fn create_category(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(company_id): Path<Uuid>,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let description = required("Description", &request.description)?;
    let kind = required("Type", &request.kind)?;

    if state.db.find_company(company_id).await?.is_none() {
        return Err(ApiError::NotFound("Company not found".to_string()));
    }

    if let Some(parent_id) = request.parent_id {
        let parent = state
            .db
            .find_category(company_id, parent_id)
            .await?
            .ok_or_else(|| ApiError::Validation("Parent category not found".to_string()))?;
        if parent.parent_id.is_some() {
            return Err(ApiError::Validation(
                "Sub-categories cannot have children".to_string(),
            ));
        }
    }

    let category = Category::new(company_id, request.parent_id, description, kind);
    state.db.insert_category(&category).await?;

    info!(
        category_id = %category.id,
        company_id = %company_id,
        created_by = %identity.user_id,
        "Category created"
    );
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Json<CategoryListResponse>> {
    let categories = state.db.list_categories(company_id).await?;
    Ok(Json(CategoryListResponse {
        total: categories.len(),
        categories,
    }))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path((company_id, category_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Category>> {
    state
        .db
        .find_category(company_id, category_id)
        .await?
        .map(Json)
        .ok_or_else(category_not_found)
}

pub async fn update_category(
    State(state): State<AppState>,
    Path((company_id, category_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateCategoryRequest>,
) -> ApiResult<Json<Category>> {
    let description = required("Description", &request.description)?;
    state
        .db
        .update_category(company_id, category_id, &description)
        .await?
        .map(Json)
        .ok_or_else(category_not_found)
}

/// Delete a category together with its sub-categories
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((company_id, category_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    if !state.db.delete_category(company_id, category_id).await? {
        return Err(category_not_found());
    }

    info!(category_id = %category_id, deleted_by = %identity.user_id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
