use super::{normalize, password::hash_blocking, signup_identifier, AuthError, SecretHasher};
use crate::{
    activity::{ActivityEvent, ActivitySink},
    store::{UserRecord, UserStore},
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, instrument};

const SIGNUP_REQUIRED: &str = "Email/phone and password required";
const LOGIN_REQUIRED: &str = "Email and password required";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOutcome {
    pub identifier: String,
    /// `true` when this login created the record.
    pub created: bool,
}

#[derive(Clone)]
pub struct CredentialService {
    store: Arc<UserStore>,
    hasher: Arc<dyn SecretHasher>,
    activity: Arc<dyn ActivitySink>,
}

impl std::fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialService")
            .field("store", &self.store.path())
            .finish_non_exhaustive()
    }
}

fn non_empty(secret: Option<&SecretString>) -> Option<&str> {
    secret
        .map(|value| value.expose_secret())
        .filter(|value| !value.is_empty())
}

impl CredentialService {
    #[must_use]
    pub fn new(
        store: Arc<UserStore>,
        hasher: Arc<dyn SecretHasher>,
        activity: Arc<dyn ActivitySink>,
    ) -> Self {
        Self {
            store,
            hasher,
            activity,
        }
    }

    #[must_use]
    pub fn store(&self) -> &UserStore {
        &self.store
    }

    /// Register a new user keyed by the normalized email, or phone when no
    /// email is given.
    ///
    /// # Errors
    /// `Validation` for a missing identifier or password, `Conflict` if the
    /// identifier is taken, `Storage`/`Hashing` for internal failures.
    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        password: Option<&SecretString>,
    ) -> Result<String, AuthError> {
        let identifier = signup_identifier(email, phone);
        let Some(password) = non_empty(password).filter(|_| !identifier.is_empty()) else {
            return Err(AuthError::Validation(SIGNUP_REQUIRED));
        };

        // Hashed before taking the writer lock; the digest is wasted on a conflict.
        let digest =
            hash_blocking(Arc::clone(&self.hasher), SecretString::from(password.to_string()))
                .await?;

        let store = self.store.lock().await;
        let mut records = store.load_all().await?;

        if records.iter().any(|record| record.identifier == identifier) {
            debug!("Signup rejected, identifier already registered");
            return Err(AuthError::Conflict);
        }

        let phone = phone.filter(|value| !value.is_empty()).map(str::to_string);
        let record = UserRecord::with_password(identifier.clone(), phone, digest);
        let event = ActivityEvent::Signup {
            identifier: record.identifier.clone(),
            phone: record.phone.clone(),
            created_at: record.created_at,
        };

        records.push(record);
        store.save_all(&records).await?;
        drop(store);

        self.activity.record(&event);

        Ok(identifier)
    }

    /// Check a credential pair. Nothing is persisted and no session is issued.
    ///
    /// # Errors
    /// `Validation` for missing fields, `InvalidCredentials` when no record
    /// matches, `Storage` if the store cannot be read.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: Option<&str>,
        password: Option<&SecretString>,
    ) -> Result<String, AuthError> {
        let identifier = normalize(email);
        let Some(password) = non_empty(password).filter(|_| !identifier.is_empty()) else {
            return Err(AuthError::Validation(LOGIN_REQUIRED));
        };

        let records = self.store.load_all().await?;

        // Records without a password (created by an identity provider) never match.
        let matched = records
            .iter()
            .filter(|record| record.identifier == identifier)
            .filter_map(|record| record.password.as_deref())
            .any(|digest| self.hasher.verify(password, digest));

        if !matched {
            self.activity
                .record(&ActivityEvent::LoginFailed { identifier });
            return Err(AuthError::InvalidCredentials);
        }

        self.activity.record(&ActivityEvent::LoginSucceeded {
            identifier: identifier.clone(),
        });

        Ok(identifier)
    }

    /// Acknowledge a logout. Returns the normalized identifier when one was given.
    #[instrument(skip(self))]
    pub fn logout(&self, email: Option<&str>) -> Option<String> {
        let identifier = normalize(email);
        if identifier.is_empty() {
            return None;
        }

        self.activity.record(&ActivityEvent::Logout {
            identifier: identifier.clone(),
        });

        Some(identifier)
    }

    /// Ensure a record exists for an identity asserted by an external provider.
    /// Existing records are left exactly as they are.
    ///
    /// # Errors
    /// `Validation` for an empty identifier, `Storage` for store failures.
    #[instrument(skip(self))]
    pub async fn provider_login(
        &self,
        provider: &str,
        identifier: &str,
    ) -> Result<ProviderOutcome, AuthError> {
        let identifier = normalize(Some(identifier));
        if identifier.is_empty() {
            return Err(AuthError::Validation(LOGIN_REQUIRED));
        }

        let created = {
            let store = self.store.lock().await;
            let mut records = store.load_all().await?;

            if records.iter().any(|record| record.identifier == identifier) {
                false
            } else {
                records.push(UserRecord::passwordless(identifier.clone()));
                store.save_all(&records).await?;
                true
            }
        };

        self.activity.record(&ActivityEvent::ProviderLogin {
            provider: provider.to_string(),
            identifier: identifier.clone(),
            created,
        });

        Ok(ProviderOutcome {
            identifier,
            created,
        })
    }
}
