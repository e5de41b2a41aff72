//! Password and lookup-key hashing

use crate::error::{AuthResult, InfraError};
use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use proposal_core::PasswordHashSettings;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Stored login credential. The plaintext email never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub user_id: Uuid,
    pub lookup_key_hash: String,
    pub password_hash: String,
}

impl Credential {
    pub fn new(user_id: Uuid, email: &str, password_hash: String) -> Self {
        Self {
            user_id,
            lookup_key_hash: hash_lookup_key(email),
            password_hash,
        }
    }
}

/// Index key for an email: SHA-256 hex of the lower-cased address.
///
/// Fast and unsalted so it can be searched by equality. It only keeps raw
/// emails out of the store and its query logs.
pub fn hash_lookup_key(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.to_lowercase().as_bytes());
    format!("{:x}", hasher.finalize())
}

const PLACEHOLDER_PASSWORD: &str = "placeholder password for unknown accounts";

/// Salted argon2id hashing with a configurable cost
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
    placeholder_hash: String,
}

impl CredentialHasher {
    pub fn new(settings: &PasswordHashSettings) -> AuthResult<Self> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|e| InfraError::Hashing(format!("invalid argon2 parameters: {e}")))?;

        let mut hasher = Self {
            params,
            placeholder_hash: String::new(),
        };
        hasher.placeholder_hash = hasher.hash_password(PLACEHOLDER_PASSWORD)?;
        Ok(hasher)
    }

    /// A hash with the configured cost that belongs to no account. Logins for
    /// unknown emails verify against it so they take as long as real ones.
    pub fn placeholder_hash(&self) -> &str {
        &self.placeholder_hash
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash_password(&self, plaintext: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| InfraError::Hashing(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
    ///
    /// The cost parameters embedded in `hash` are used, so hashes made under
    /// an older configuration keep verifying.
    pub fn verify_password(&self, hash: &str, plaintext: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| InfraError::Hashing(format!("malformed password hash: {e}")))?;

        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(InfraError::Hashing(e.to_string()).into()),
        }
    }

    /// [`Self::hash_password`] on the blocking pool
    pub async fn hash_password_async(&self, plaintext: String) -> AuthResult<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_password(&plaintext))
            .await
            .map_err(|e| InfraError::Task(e.to_string()))?
    }

    /// [`Self::verify_password`] on the blocking pool
    pub async fn verify_password_async(&self, hash: String, plaintext: String) -> AuthResult<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&hash, &plaintext))
            .await
            .map_err(|e| InfraError::Task(e.to_string()))?
    }
}
