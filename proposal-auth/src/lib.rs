//! Authentication and authorization core
//!
//! Credentials are checked by [`SessionIssuer`], which persists a [`Session`]
//! and hands out an HS256 bearer token. [`SessionValidator`] turns the token
//! back into an [`Identity`] after cross-checking the stored session, and
//! [`AccessController`] applies the path-driven role policy in [`policy`].

pub mod access;
pub mod accounts;
pub mod credentials;
pub mod error;
pub mod issuer;
pub mod jwt;
pub mod memory;
pub mod permissions;
pub mod policy;
pub mod route;
pub mod service;
pub mod session;
pub mod store;
pub mod validator;

pub use access::AccessController;
pub use accounts::{AccountError, AccountResult, AccountService};
pub use credentials::{hash_lookup_key, Credential, CredentialHasher};
pub use error::{AuthError, AuthResult, ErrorKind, InfraError, StoreError, TokenRejection};
pub use issuer::SessionIssuer;
pub use jwt::{Claims, TokenCodec};
pub use memory::MemoryStore;
pub use permissions::{Permission, Role, UnknownRole};
pub use route::{Method, Route, RouteList};
pub use service::{AuthService, AuthStores, RouteRules};
pub use session::{Identity, IssuedToken, Session};
pub use store::{CredentialStore, PermissionStore, SessionStore, StoreResult};
pub use validator::{extract_bearer, SessionValidator};
