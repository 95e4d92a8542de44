use super::{CallbackQuery, IdentityProvider, ProviderLogin};
use crate::auth::normalize;
use url::{form_urlencoded::byte_serialize, Url};

/// Identity used when the callback carries no usable email.
pub const DEFAULT_MOCK_EMAIL: &str = "mockuser@facebook.com";
/// Where the consent form submits.
const CALLBACK_PATH: &str = "/mock-facebook-success";
const SUCCESS_PATH: &str = "facebook-success";
const CONSENT_TEMPLATE: &str = include_str!("consent.html");

/// Stand-in for Facebook login. The submitted password is never checked.
#[derive(Debug, Clone)]
pub struct MockFacebookProvider {
    frontend_url: Url,
}

impl MockFacebookProvider {
    #[must_use]
    pub fn new(frontend_url: Url) -> Self {
        Self { frontend_url }
    }

    fn redirect_for(&self, identifier: &str) -> Url {
        let mut url = self.frontend_url.clone();
        let path = format!("{}/{SUCCESS_PATH}", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.set_fragment(None);
        url.set_query(Some(&format!("email={}", encode_component(identifier))));
        url
    }
}

// Percent-encodes like a browser's `encodeURIComponent` for the characters
// that matter here: a space becomes `%20`, not `+`.
fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl IdentityProvider for MockFacebookProvider {
    fn name(&self) -> &str {
        "facebook"
    }

    fn render_consent(&self) -> String {
        CONSENT_TEMPLATE.replace("{ACTION}", CALLBACK_PATH)
    }

    fn complete_login(&self, query: &CallbackQuery) -> ProviderLogin {
        let identifier = Some(normalize(query.email.as_deref()))
            .filter(|identifier| !identifier.is_empty())
            .unwrap_or_else(|| DEFAULT_MOCK_EMAIL.to_string());
        let redirect = self.redirect_for(&identifier);

        ProviderLogin {
            identifier,
            redirect,
        }
    }
}
