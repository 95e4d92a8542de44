//! Credential handling: identifier normalization, password digests and the
//! signup/login/logout/provider-login operations on top of the user store.
//!
//! Identifiers are matched after [`normalize`], so `" Alice@Example.com "` and
//! `"alice@example.com"` are the same user. There are no sessions: login is a
//! one-shot credential check and logout only records that it happened.

mod error;
mod normalize;
mod password;
mod service;

pub use error::AuthError;
pub use normalize::{normalize, signup_identifier};
pub use password::{Argon2Hasher, HashError, SecretHasher};
pub use service::{CredentialService, ProviderOutcome};

#[cfg(test)]
pub(crate) use password::test_hasher;
