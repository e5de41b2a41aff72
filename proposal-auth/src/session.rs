//! Sessions and the identity they prove

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side record of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// New session starting at `now`, truncated to whole seconds so that it
    /// survives the epoch-seconds token encoding unchanged.
    ///
    /// `None` when `now + ttl` is not representable.
    pub fn start(user_id: Uuid, now: DateTime<Utc>, ttl: Duration) -> Option<Self> {
        let created_at = now.trunc_subsecs(0);
        Some(Self {
            id: Uuid::new_v4(),
            user_id,
            created_at,
            expires_at: created_at.checked_add_signed(ttl)?,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Authenticated caller, attached to the request once its token checks out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub session_id: Uuid,
}

impl From<&Session> for Identity {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            session_id: session.id,
        }
    }
}

/// Result of a login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub session: Session,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.session.expires_at
    }
}
