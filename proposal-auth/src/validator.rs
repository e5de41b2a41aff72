//! Bearer token validation against the session store

use crate::error::{AuthResult, TokenRejection};
use crate::jwt::TokenCodec;
use crate::route::{Method, RouteList};
use crate::session::Identity;
use crate::store::SessionStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

const BEARER_SCHEME: &str = "Bearer";

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn extract_bearer(header: Option<&str>) -> Result<&str, TokenRejection> {
    let header = header.ok_or(TokenRejection::MissingHeader)?;

    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(TokenRejection::MalformedHeader)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME)
        || token.is_empty()
        || token.contains(char::is_whitespace)
    {
        return Err(TokenRejection::MalformedHeader);
    }

    Ok(token)
}

pub struct SessionValidator {
    codec: Arc<TokenCodec>,
    sessions: Arc<dyn SessionStore>,
    bypass: RouteList,
}

impl SessionValidator {
    pub fn new(codec: Arc<TokenCodec>, sessions: Arc<dyn SessionStore>, bypass: RouteList) -> Self {
        Self {
            codec,
            sessions,
            bypass,
        }
    }

    /// Whether `{method, path}` skips validation entirely
    pub fn is_bypassed(&self, method: Method, path: &str) -> bool {
        self.bypass.contains(method, path)
    }

    pub async fn validate(&self, authorization: Option<&str>) -> AuthResult<Identity> {
        self.validate_at(authorization, Utc::now()).await
    }

    /// Authenticate an `Authorization` header value as of `now`
    pub async fn validate_at(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthResult<Identity> {
        let token = extract_bearer(authorization)?;
        let claims = self.codec.decode(token)?;

        let session = match self.sessions.find_session(claims.sid).await? {
            Some(session) => session,
            None => {
                warn!(session_id = %claims.sid, "Token refers to unknown session");
                return Err(TokenRejection::UnknownSession.into());
            }
        };

        if !claims.matches(&session) {
            warn!(
                session_id = %session.id,
                token_user_id = %claims.sub,
                session_user_id = %session.user_id,
                "Session details do not match token"
            );
            return Err(TokenRejection::SessionMismatch.into());
        }

        if session.is_expired_at(now) {
            debug!(session_id = %session.id, expired_at = %session.expires_at, "Session has expired");
            return Err(TokenRejection::Expired.into());
        }

        Ok(Identity::from(&session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::route::Route;
    use crate::session::Session;
    use chrono::Duration;
    use uuid::Uuid;

    struct Fixture {
        store: Arc<MemoryStore>,
        codec: Arc<TokenCodec>,
        validator: SessionValidator,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let codec = Arc::new(TokenCodec::new(b"validator-secret"));
        let validator = SessionValidator::new(
            codec.clone(),
            store.clone(),
            RouteList::new([Route::new(Method::Post, "/users/login")]),
        );
        Fixture {
            store,
            codec,
            validator,
        }
    }

    async fn issue(f: &Fixture, session: &Session) -> String {
        f.store.insert_session(session).await.unwrap();
        format!("Bearer {}", f.codec.encode(session).unwrap())
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(extract_bearer(Some("bearer abc")), Ok("abc"));
        assert_eq!(extract_bearer(None), Err(TokenRejection::MissingHeader));
        assert_eq!(extract_bearer(Some("Bearer")), Err(TokenRejection::MalformedHeader));
        assert_eq!(extract_bearer(Some("Bearer ")), Err(TokenRejection::MalformedHeader));
        assert_eq!(extract_bearer(Some("Basic dXNlcjpwdw==")), Err(TokenRejection::MalformedHeader));
        assert_eq!(extract_bearer(Some("Bearer a b")), Err(TokenRejection::MalformedHeader));
    }

    #[tokio::test]
    async fn test_valid_token_yields_identity() {
        let f = fixture();
        let session = Session::start(Uuid::new_v4(), Utc::now(), Duration::minutes(5)).unwrap();
        let header = issue(&f, &session).await;

        let identity = f.validator.validate(Some(&header)).await.unwrap();
        assert_eq!(identity.user_id, session.user_id);
        assert_eq!(identity.session_id, session.id);
    }

    #[tokio::test]
    async fn test_signed_token_without_session_is_rejected() {
        let f = fixture();
        let session = Session::start(Uuid::new_v4(), Utc::now(), Duration::minutes(5)).unwrap();
        let header = format!("Bearer {}", f.codec.encode(&session).unwrap());

        let err = f.validator.validate(Some(&header)).await.unwrap_err();
        assert_eq!(err.rejection(), Some(TokenRejection::UnknownSession));
    }

    #[tokio::test]
    async fn test_altered_session_is_a_mismatch() {
        let f = fixture();
        let session = Session::start(Uuid::new_v4(), Utc::now(), Duration::minutes(5)).unwrap();
        let header = issue(&f, &session).await;

        let mut extended = session.clone();
        extended.expires_at = session.expires_at + Duration::hours(1);
        f.store.replace_session(extended).await;

        let err = f.validator.validate(Some(&header)).await.unwrap_err();
        assert_eq!(err.rejection(), Some(TokenRejection::SessionMismatch));
    }

    #[tokio::test]
    async fn test_expiry_is_checked_against_now() {
        let f = fixture();
        let start = Utc::now();
        let session = Session::start(Uuid::new_v4(), start, Duration::minutes(5)).unwrap();
        let header = issue(&f, &session).await;

        assert!(f
            .validator
            .validate_at(Some(&header), session.expires_at)
            .await
            .is_ok());

        let err = f
            .validator
            .validate_at(Some(&header), session.expires_at + Duration::seconds(1))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(TokenRejection::Expired));
    }

    #[tokio::test]
    async fn test_garbage_token_is_undecodable() {
        let f = fixture();
        let err = f
            .validator
            .validate(Some("Bearer not.a.token"))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(TokenRejection::Undecodable));
    }

    #[test]
    fn test_bypass_is_exact() {
        let f = fixture();
        assert!(f.validator.is_bypassed(Method::Post, "/users/login"));
        assert!(!f.validator.is_bypassed(Method::Get, "/users/login"));
        assert!(!f.validator.is_bypassed(Method::Post, "/users/login/reset"));
    }
}
