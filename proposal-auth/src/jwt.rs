//! Bearer token codec (HS256 JWT)

use crate::error::{AuthResult, InfraError, TokenRejection};
use crate::session::Session;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use proposal_core::AuthSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// JWT claims carried by every access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Session ID
    pub sid: Uuid,
    /// Issued at (epoch seconds)
    pub iat: i64,
    /// Expiration time (epoch seconds)
    pub exp: i64,
}

impl Claims {
    pub fn for_session(session: &Session) -> Self {
        Self {
            sub: session.user_id,
            sid: session.id,
            iat: session.created_at.timestamp(),
            exp: session.expires_at.timestamp(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Exact agreement with the persisted session on every cross-checked field
    pub fn matches(&self, session: &Session) -> bool {
        self.sid == session.id
            && self.sub == session.user_id
            && self.issued_at() == Some(session.created_at)
            && self.expires_at() == Some(session.expires_at)
    }
}

/// Signs and verifies access tokens with one symmetric secret and one algorithm
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Self::ALGORITHM);
        // Expiry is judged by the session validator against the stored
        // session, so an expired token still decodes here.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(settings.signing_secret.as_bytes())
    }

    pub fn encode(&self, session: &Session) -> AuthResult<String> {
        let claims = Claims::for_session(session);
        encode(&Header::new(Self::ALGORITHM), &claims, &self.encoding)
            .map_err(|e| InfraError::Signing(e.to_string()).into())
    }

    /// Verify the signature and algorithm, then parse the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenRejection> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(reason = %e, "Token failed to decode");
                TokenRejection::Undecodable
            })
    }
}
