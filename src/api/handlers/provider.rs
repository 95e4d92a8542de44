//! Mock third-party login: consent page and callback.

use crate::{
    auth::{AuthError, CredentialService},
    provider::{CallbackQuery, IdentityProvider},
};
use axum::{
    extract::{Extension, Query},
    http::{header::LOCATION, StatusCode},
    response::{Html, IntoResponse},
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    get,
    path= "/auth/facebook",
    responses (
        (status = 200, description = "Provider login form", body = String, content_type = "text/html"),
    ),
    tag= "provider"
)]
pub async fn consent(provider: Extension<Arc<dyn IdentityProvider>>) -> Html<String> {
    Html(provider.render_consent())
}

#[utoipa::path(
    get,
    path= "/mock-facebook-success",
    params(CallbackQuery),
    responses (
        (status = 302, description = "Redirect to the frontend with the identity in the `email` query parameter"),
        (status = 500, description = "User store unavailable"),
    ),
    tag= "provider"
)]
#[instrument(skip(provider, credentials))]
pub async fn callback(
    provider: Extension<Arc<dyn IdentityProvider>>,
    credentials: Extension<Arc<CredentialService>>,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, AuthError> {
    let login = provider.complete_login(&query);

    let outcome = credentials
        .provider_login(provider.name(), &login.identifier)
        .await?;
    debug!(created = outcome.created, "provider login for {}", outcome.identifier);

    Ok((StatusCode::FOUND, [(LOCATION, login.redirect.to_string())]))
}
