//! Path-driven role-based access control
//!
//! A request path is walked as `(resource, id)` pairs. Each recognised
//! resource is looked up in [`POLICY`] by method and by whether more segments
//! follow the pair; the first denial ends the walk.

use crate::error::{AuthError, AuthResult};
use crate::permissions::{Permission, Role};
use crate::route::Method;
use crate::session::Identity;
use tracing::{debug, warn};
use uuid::Uuid;

/// Resource keywords that carry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Companies,
    Contracts,
}

impl ResourceKind {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "companies" => Some(ResourceKind::Companies),
            "contracts" => Some(ResourceKind::Contracts),
            _ => None,
        }
    }
}

/// What a policy entry demands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Deny,
    /// Any one of these roles, held for the company in scope
    AnyOf(&'static [Role]),
}

/// One row of the policy table. `nested: None` matches either depth.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub resource: ResourceKind,
    pub method: Method,
    pub nested: Option<bool>,
    pub requirement: Requirement,
}

const COMPANY_MEMBERS: &[Role] = &[
    Role::CompanyAdmin,
    Role::CompanyProjectManager,
    Role::CompanyContributor,
];
const COMPANY_ADMINS: &[Role] = &[Role::CompanyAdmin];
const PROJECT_MANAGERS: &[Role] = &[Role::CompanyProjectManager];

pub const POLICY: &[Rule] = &[
    // POST /companies/{id}/...
    Rule {
        resource: ResourceKind::Companies,
        method: Method::Post,
        nested: Some(true),
        requirement: Requirement::AnyOf(COMPANY_MEMBERS),
    },
    // POST /companies is gated by authentication alone, never by this table
    Rule {
        resource: ResourceKind::Companies,
        method: Method::Post,
        nested: Some(false),
        requirement: Requirement::Deny,
    },
    // PUT /companies/{id}/...
    Rule {
        resource: ResourceKind::Companies,
        method: Method::Put,
        nested: Some(true),
        requirement: Requirement::AnyOf(COMPANY_MEMBERS),
    },
    // PUT /companies/{id}
    Rule {
        resource: ResourceKind::Companies,
        method: Method::Put,
        nested: Some(false),
        requirement: Requirement::AnyOf(COMPANY_ADMINS),
    },
    Rule {
        resource: ResourceKind::Companies,
        method: Method::Get,
        nested: None,
        requirement: Requirement::AnyOf(COMPANY_MEMBERS),
    },
    // POST /companies/{id}/contracts
    Rule {
        resource: ResourceKind::Contracts,
        method: Method::Post,
        nested: None,
        requirement: Requirement::AnyOf(PROJECT_MANAGERS),
    },
];

/// Table lookup; anything not listed is denied
pub fn requirement(resource: ResourceKind, method: Method, has_more_parts: bool) -> Requirement {
    POLICY
        .iter()
        .find(|rule| {
            rule.resource == resource
                && rule.method == method
                && rule.nested.map_or(true, |nested| nested == has_more_parts)
        })
        .map(|rule| rule.requirement)
        .unwrap_or(Requirement::Deny)
}

fn satisfies(requirement: Requirement, company_id: Option<Uuid>, permissions: &[Permission]) -> bool {
    match (requirement, company_id) {
        (Requirement::AnyOf(roles), Some(company_id)) => permissions
            .iter()
            .any(|permission| roles.iter().any(|role| permission.grants(*role, company_id))),
        _ => false,
    }
}

pub fn is_admin(permissions: &[Permission]) -> bool {
    permissions.iter().any(|p| p.role == Role::Admin)
}

/// Decide whether `permissions` allow `method` on `path`.
///
/// A global `admin` grant allows everything. Otherwise every recognised
/// resource pair on the path must pass; an id that is not a UUID never does.
pub fn authorize(
    method: Method,
    identity: &Identity,
    permissions: &[Permission],
    path: &str,
) -> AuthResult<()> {
    if is_admin(permissions) {
        debug!(user_id = %identity.user_id, %method, path, "Authorized admin");
        return Ok(());
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut company_in_scope: Option<Uuid> = None;

    for index in (0..segments.len()).step_by(2) {
        let Some(resource) = ResourceKind::from_segment(segments[index]) else {
            continue;
        };
        let has_more_parts = index + 2 < segments.len();
        let id = segments.get(index + 1).and_then(|raw| Uuid::parse_str(raw).ok());

        let company_id = match resource {
            ResourceKind::Companies => {
                company_in_scope = id;
                id
            }
            ResourceKind::Contracts => company_in_scope,
        };

        let requirement = requirement(resource, method, has_more_parts);
        if !satisfies(requirement, company_id, permissions) {
            warn!(
                user_id = %identity.user_id,
                %method,
                path,
                resource = ?resource,
                "Unauthorized request"
            );
            return Err(AuthError::Unauthorized);
        }
    }

    Ok(())
}
