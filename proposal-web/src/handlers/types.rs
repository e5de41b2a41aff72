//! Request and response bodies

use crate::models::{Category, User, UserProfile};
use proposal_auth::{Permission, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub total: usize,
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Milliseconds since the Unix epoch
    pub expires_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct CompanyRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GrantPermissionRequest {
    pub user_id: Uuid,
    pub role: Role,
    #[serde(default)]
    pub contract_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePermissionRequest {
    pub role: Role,
    #[serde(default)]
    pub contract_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PermissionListResponse {
    pub total: usize,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Deserialize)]
pub struct ContractRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub total: usize,
    pub categories: Vec<Category>,
}
