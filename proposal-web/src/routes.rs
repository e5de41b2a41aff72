//! Route definitions and the route lists the auth pipeline consults

use crate::{handlers, AppState};
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use proposal_auth::{Method, Route, RouteList, RouteRules};

/// Routes that skip authentication, and routes that need a session but no grant.
///
/// Login is the only anonymous route; accounts are created by signed-in
/// users, starting from the configured bootstrap user.
pub fn route_rules() -> RouteRules {
    RouteRules {
        bypass: RouteList::new([Route::new(Method::Post, "/users/login")]),
        authenticated_only: RouteList::new([
            Route::new(Method::Get, "/status"),
            Route::new(Method::Post, "/users"),
            Route::new(Method::Post, "/companies"),
        ]),
    }
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::get_status))
        // Users
        .route("/users", post(handlers::register).get(handlers::list_users))
        .route("/users/login", post(handlers::login))
        .route("/users/password", patch(handlers::change_password))
        .route("/users/logout", post(handlers::logout))
        .route(
            "/users/{user_id}",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        // Companies
        .route("/companies", post(handlers::create_company))
        .route(
            "/companies/{company_id}",
            get(handlers::get_company)
                .put(handlers::update_company)
                .delete(handlers::delete_company),
        )
        // Permissions
        .route(
            "/companies/{company_id}/permissions",
            post(handlers::grant_permission).get(handlers::list_permissions),
        )
        .route(
            "/companies/{company_id}/permissions/{permission_id}",
            put(handlers::update_permission).delete(handlers::revoke_permission),
        )
        // Contracts
        .route(
            "/companies/{company_id}/contracts",
            post(handlers::create_contract),
        )
        // Categories
        .route(
            "/companies/{company_id}/categories",
            post(handlers::create_category).get(handlers::list_categories),
        )
        .route(
            "/companies/{company_id}/categories/{category_id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
}
