//! Auth activity events.
//!
//! Handlers report what happened through an [`ActivitySink`] instead of writing
//! to the console, so the destination can be swapped (and inspected in tests).

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActivityEvent {
    Signup {
        identifier: String,
        phone: Option<String>,
        created_at: DateTime<Utc>,
    },
    LoginSucceeded {
        identifier: String,
    },
    LoginFailed {
        identifier: String,
    },
    Logout {
        identifier: String,
    },
    ProviderLogin {
        provider: String,
        identifier: String,
        created: bool,
    },
}

impl ActivityEvent {
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::Signup { .. } => "signup",
            Self::LoginSucceeded { .. } => "login",
            Self::LoginFailed { .. } => "login_failed",
            Self::Logout { .. } => "logout",
            Self::ProviderLogin { .. } => "provider_login",
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Signup { identifier, .. }
            | Self::LoginSucceeded { identifier }
            | Self::LoginFailed { identifier }
            | Self::Logout { identifier }
            | Self::ProviderLogin { identifier, .. } => identifier,
        }
    }
}

pub trait ActivitySink: Send + Sync {
    fn record(&self, event: &ActivityEvent);
}

/// Writes every event as a structured `tracing` event under the `activity` target.
#[derive(Clone, Debug, Default)]
pub struct TracingActivitySink;

impl ActivitySink for TracingActivitySink {
    fn record(&self, event: &ActivityEvent) {
        match event {
            ActivityEvent::Signup {
                identifier,
                phone,
                created_at,
            } => info!(
                target: "activity",
                action = event.action(),
                identifier = %identifier,
                phone = phone.as_deref().unwrap_or(""),
                created_at = %created_at.to_rfc3339(),
                "Signup"
            ),
            ActivityEvent::LoginSucceeded { identifier } => {
                info!(target: "activity", action = event.action(), identifier = %identifier, "Login");
            }
            ActivityEvent::LoginFailed { identifier } => {
                info!(target: "activity", action = event.action(), identifier = %identifier, "Failed login");
            }
            ActivityEvent::Logout { identifier } => {
                info!(target: "activity", action = event.action(), identifier = %identifier, "Logout");
            }
            ActivityEvent::ProviderLogin {
                provider,
                identifier,
                created,
            } => info!(
                target: "activity",
                action = event.action(),
                provider = %provider,
                identifier = %identifier,
                created,
                "Provider login"
            ),
        }
    }
}

/// Keeps events in memory. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct RecordingActivitySink {
    events: Arc<Mutex<Vec<ActivityEvent>>>,
}

impl RecordingActivitySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<ActivityEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn actions(&self) -> Vec<&'static str> {
        self.events().iter().map(ActivityEvent::action).collect()
    }
}

impl ActivitySink for RecordingActivitySink {
    fn record(&self, event: &ActivityEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
