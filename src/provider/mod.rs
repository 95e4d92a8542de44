//! External identity providers.
//!
//! A provider owns two steps of a third-party login: the consent page shown to
//! the user and the callback that turns the provider's answer into an
//! identifier plus the frontend URL to send the browser back to. Creating the
//! local record is left to [`crate::auth::CredentialService::provider_login`].
//!
//! Only [`MockFacebookProvider`] exists today; it imitates the flow without any
//! network traffic so the frontend can exercise the "log in with" path.

mod mock;

pub use mock::{MockFacebookProvider, DEFAULT_MOCK_EMAIL};

use serde::Deserialize;
use url::Url;
use utoipa::IntoParams;

/// Query string received on the provider callback.
#[derive(Deserialize, IntoParams, Debug, Default, Clone)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    /// Identity asserted by the provider.
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderLogin {
    pub identifier: String,
    pub redirect: Url,
}

pub trait IdentityProvider: Send + Sync {
    /// Short name used in activity events, e.g. `facebook`.
    fn name(&self) -> &str;

    /// HTML page shown before the user is sent back.
    fn render_consent(&self) -> String;

    /// Resolve the callback into a normalized identifier and the frontend redirect.
    fn complete_login(&self, query: &CallbackQuery) -> ProviderLogin;
}
