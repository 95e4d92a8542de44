//! Password digests.
//!
//! New records store an Argon2id PHC string (`$argon2id$v=19$...`). Documents
//! written before hashing was introduced carry the plaintext password; those
//! values still verify by exact comparison until the user signs up again under
//! a new identifier, and every such match is logged.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
#[error("failed to hash password: {0}")]
pub struct HashError(String);

pub trait SecretHasher: Send + Sync {
    /// # Errors
    /// Returns an error if the digest cannot be computed.
    fn hash(&self, secret: &str) -> Result<String, HashError>;

    fn verify(&self, secret: &str, digest: &str) -> bool;
}

#[derive(Clone, Debug)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| HashError(err.to_string()))
    }

    fn verify(&self, secret: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            // Parameters come from the stored digest, not from `self.params`.
            Ok(parsed) => self
                .argon2()
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => {
                let matches = secret == digest;
                if matches {
                    warn!("Verified a legacy plaintext password; the record is not hashed");
                }
                matches
            }
        }
    }
}

/// Run `hasher.hash` on the blocking pool; Argon2 is CPU bound.
pub(super) async fn hash_blocking(
    hasher: Arc<dyn SecretHasher>,
    secret: SecretString,
) -> Result<String, HashError> {
    tokio::task::spawn_blocking(move || hasher.hash(secret.expose_secret()))
        .await
        .map_err(|err| HashError(err.to_string()))?
}

#[cfg(test)]
pub(crate) fn test_hasher() -> Argon2Hasher {
    // Cheap parameters keep the test suite fast; production uses the defaults.
    Argon2Hasher::new(Params::new(1024, 1, 1, None).unwrap_or_default())
}
