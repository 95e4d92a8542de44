use super::types::{AuthResponse, LoginRequest};
use crate::auth::{AuthError, CredentialService};
use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    post,
    path= "/api/login",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "Login successful", body = AuthResponse, content_type = "application/json"),
        (status = 400, description = "Missing email or password", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = AuthResponse),
        (status = 500, description = "User store unavailable", body = AuthResponse),
    ),
    tag= "auth"
)]
#[instrument(skip(credentials, payload))]
pub async fn login(
    credentials: Extension<Arc<CredentialService>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Json<AuthResponse>, AuthError> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();

    let identifier = credentials
        .login(request.email.as_deref(), request.password.as_ref())
        .await?;

    Ok(Json(AuthResponse::ok("Login successful", Some(identifier))))
}
