use super::password::HashError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field is missing or empty.
    #[error("{0}")]
    Validation(&'static str),
    #[error("User already exists")]
    Conflict,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error(transparent)]
    Hashing(#[from] HashError),
}

impl AuthError {
    /// Internal failures are reported to callers without detail.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Hashing(_))
    }
}
