use super::types::{AuthResponse, LogoutRequest};
use crate::auth::CredentialService;
use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    post,
    path= "/api/logout",
    request_body = LogoutRequest,
    responses (
        (status = 200, description = "Always succeeds; there is no server-side session", body = AuthResponse, content_type = "application/json"),
    ),
    tag= "auth"
)]
#[instrument(skip(credentials, payload))]
pub async fn logout(
    credentials: Extension<Arc<CredentialService>>,
    payload: Option<Json<LogoutRequest>>,
) -> Json<AuthResponse> {
    let email = payload.and_then(|Json(request)| request.email);
    credentials.logout(email.as_deref());

    Json(AuthResponse::ok("Logged out successfully", None))
}
