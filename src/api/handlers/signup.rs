use super::types::{AuthResponse, SignupRequest};
use crate::auth::{AuthError, CredentialService};
use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    post,
    path= "/api/signup",
    request_body = SignupRequest,
    responses (
        (status = 200, description = "Signup successful", body = AuthResponse, content_type = "application/json"),
        (status = 400, description = "Missing email/phone or password, or the user already exists", body = AuthResponse),
        (status = 500, description = "User store unavailable", body = AuthResponse),
    ),
    tag= "auth"
)]
#[instrument(skip(credentials, payload))]
pub async fn signup(
    credentials: Extension<Arc<CredentialService>>,
    payload: Option<Json<SignupRequest>>,
) -> Result<Json<AuthResponse>, AuthError> {
    // A missing or malformed body is reported like an empty one.
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    debug!("signup request: {:?}", request);

    let identifier = credentials
        .signup(
            request.email.as_deref(),
            request.phone.as_deref(),
            request.password.as_ref(),
        )
        .await?;

    Ok(Json(AuthResponse::ok("Signup successful", Some(identifier))))
}
