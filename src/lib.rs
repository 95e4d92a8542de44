//! # Flatauth (Flat-file Credential Store)
//!
//! `flatauth` is a small authentication backend: signup, login and logout over
//! JSON, users persisted in a single JSON document, and a mock third-party
//! ("Facebook") login that renders a fake provider page and redirects back to
//! the frontend with the user's identity.
//!
//! ## Identifiers
//!
//! Users are keyed by an identifier: the email given at signup, or the phone
//! number when no email is given. Identifiers are trimmed and lowercased before
//! every comparison, so there is exactly one record per normalized identifier.
//!
//! ## Storage
//!
//! The whole user collection is read, modified in memory and written back for
//! every change. Writers are serialized by an in-process lock and writes are
//! atomic renames; the format stays a pretty-printed array so the file can be
//! inspected and edited by hand. See [`store`] for the corrupt-file policy.
//!
//! ## Passwords
//!
//! Passwords are stored as salted Argon2id digests. There are no sessions:
//! login answers "do these credentials match" and nothing more.

pub mod activity;
pub mod api;
pub mod auth;
pub mod cli;
pub mod provider;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
