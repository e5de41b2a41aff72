//! Authentication and authorization middleware
//!
//! `authenticate` runs first and leaves an [`Identity`] in the request
//! extensions; `authorize` reads it and applies the role policy.

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{self, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use proposal_auth::{AuthError, Identity, Method};
use tracing::debug;

/// Map an HTTP method onto the methods the policy knows about
pub fn auth_method(method: &http::Method) -> Option<Method> {
    method.as_str().parse().ok()
}

fn is_bypassed(state: &AppState, request: &Request) -> bool {
    auth_method(request.method())
        .is_some_and(|method| state.auth.validator.is_bypassed(method, request.uri().path()))
}

/// Validate the bearer token unless the route is bypass-listed
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if is_bypassed(&state, &request) {
        return next.run(request).await;
    }

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default());

    match state.auth.validator.validate(header).await {
        Ok(identity) => {
            debug!(
                user_id = %identity.user_id,
                session_id = %identity.session_id,
                path = %request.uri().path(),
                "Authenticated request"
            );
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Apply the role policy to the authenticated caller
pub async fn authorize(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if is_bypassed(&state, &request) {
        return next.run(request).await;
    }

    // Layer ordering guarantees this for every non-bypassed route.
    let Some(identity) = request.extensions().get::<Identity>().copied() else {
        return ApiError::from(AuthError::Unauthorized).into_response();
    };
    let Some(method) = auth_method(request.method()) else {
        return ApiError::from(AuthError::Unauthorized).into_response();
    };

    match state
        .auth
        .access
        .authorize_request(method, &identity, request.uri().path())
        .await
    {
        Ok(()) => next.run(request).await,
        Err(err) => ApiError::from(err).into_response(),
    }
}
