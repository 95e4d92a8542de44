//! Request/response bodies for the auth endpoints.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct SignupRequest {
    pub email: Option<String>,
    /// Used as the identifier when no email is given.
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "secret")]
    #[schema(value_type = Option<String>, format = Password)]
    pub password: Option<SecretString>,
}

#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    #[serde(default, deserialize_with = "secret")]
    #[schema(value_type = Option<String>, format = Password)]
    pub password: Option<SecretString>,
}

#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct LogoutRequest {
    pub email: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AuthResponse {
    #[must_use]
    pub fn ok(message: &str, email: Option<String>) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            email,
        }
    }

    #[must_use]
    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            email: None,
        }
    }
}
