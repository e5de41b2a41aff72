//! Error taxonomy for authentication and authorization
//!
//! Callers branch on [`AuthError::kind`]; the inner detail ([`TokenRejection`],
//! [`InfraError`]) is for logs and tests and is never rendered to clients.

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Explicit discriminant for mapping failures to transport status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidCredentials,
    InvalidToken,
    Unauthorized,
    Infra,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password are deliberately indistinguishable
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(TokenRejection),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials => ErrorKind::InvalidCredentials,
            AuthError::InvalidToken(_) => ErrorKind::InvalidToken,
            AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::Infra(_) => ErrorKind::Infra,
        }
    }

    /// The token rejection reason, if this is a token failure
    pub fn rejection(&self) -> Option<TokenRejection> {
        match self {
            AuthError::InvalidToken(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<TokenRejection> for AuthError {
    fn from(reason: TokenRejection) -> Self {
        AuthError::InvalidToken(reason)
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Infra(InfraError::Store(err))
    }
}

/// Why a bearer token was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenRejection {
    MissingHeader,
    MalformedHeader,
    /// Bad signature, wrong algorithm, or missing/ill-typed claims
    Undecodable,
    UnknownSession,
    SessionMismatch,
    Expired,
}

impl std::fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            TokenRejection::MissingHeader => "missing bearer token",
            TokenRejection::MalformedHeader => "malformed authorization header",
            TokenRejection::Undecodable => "invalid token",
            TokenRejection::UnknownSession => "invalid token",
            TokenRejection::SessionMismatch => "session details do not match token",
            TokenRejection::Expired => "session has expired",
        };
        f.write_str(message)
    }
}

/// Failures of the machinery rather than of the caller
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("invalid auth configuration: {0}")]
    Config(String),

    #[error("time arithmetic out of range: {0}")]
    Clock(String),
}

/// Errors reported by credential, session and permission store adapters
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}
