//! Roles and permission grants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Closed set of roles a user can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Global super-role, not scoped to a company
    Admin,
    CompanyAdmin,
    CompanyContributor,
    CompanyProjectManager,
    Prospect,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::CompanyAdmin,
        Role::CompanyContributor,
        Role::CompanyProjectManager,
        Role::Prospect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::CompanyAdmin => "company_admin",
            Role::CompanyContributor => "company_contributor",
            Role::CompanyProjectManager => "company_project_manager",
            Role::Prospect => "prospect",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// A role granted to a user, optionally scoped to a company and contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub role: Role,
    pub contract_id: Option<Uuid>,
}

impl Permission {
    pub fn new(user_id: Uuid, company_id: Option<Uuid>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            company_id,
            role,
            contract_id: None,
        }
    }

    pub fn with_contract(mut self, contract_id: Uuid) -> Self {
        self.contract_id = Some(contract_id);
        self
    }

    /// Whether this grant gives `role` inside `company_id`
    pub fn grants(&self, role: Role, company_id: Uuid) -> bool {
        self.role == role && self.company_id == Some(company_id)
    }
}
