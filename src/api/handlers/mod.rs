//! HTTP handlers.
//!
//! Every auth failure leaves through [`AuthError`]'s `IntoResponse`, which
//! renders `{ "success": false, "message": ... }` with the matching status.
//! Internal errors are logged here and reported without detail.

pub mod health;
pub mod login;
pub mod logout;
pub mod provider;
pub mod root;
pub mod signup;
pub mod types;

use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;
use types::AuthResponse;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

impl AuthError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Storage(_) | Self::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if self.is_internal() {
            error!("Request failed: {self}");
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        (status, Json(AuthResponse::failure(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use anyhow::Result;
    use axum::body::to_bytes;
    use std::{io, path::PathBuf};

    async fn body(error: AuthError) -> Result<(StatusCode, AuthResponse)> {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    #[tokio::test]
    async fn client_errors_keep_their_message() -> Result<()> {
        let (status, response) = body(AuthError::Conflict).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, AuthResponse::failure("User already exists".into()));

        let (status, response) = body(AuthError::InvalidCredentials).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.message, "Invalid credentials");

        let (status, response) = body(AuthError::Validation("Email and password required")).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response.message, "Email and password required");
        Ok(())
    }

    #[tokio::test]
    async fn storage_errors_are_opaque() -> Result<()> {
        let error = AuthError::Storage(StoreError::Io {
            path: PathBuf::from("/srv/secret/users.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        });

        let (status, response) = body(error).await?;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.success);
        assert_eq!(response.message, INTERNAL_ERROR_MESSAGE);
        Ok(())
    }
}
