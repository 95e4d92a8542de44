use crate::{
    activity::TracingActivitySink,
    api::{self, AppState},
    auth::{Argon2Hasher, CredentialService},
    provider::MockFacebookProvider,
    store::UserStore,
};
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub data_dir: PathBuf,
    pub frontend_url: Url,
    pub allowed_origins: Vec<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the data file cannot be created, an origin is invalid, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let store = Arc::new(UserStore::in_dir(&args.data_dir));
    store
        .ensure_initialized()
        .await
        .with_context(|| format!("Could not initialize {}", store.path().display()))?;

    let credentials = CredentialService::new(
        store,
        Arc::new(Argon2Hasher::default()),
        Arc::new(TracingActivitySink),
    );

    let allowed_origins = allowed_origins(&args)?;

    let state = AppState {
        credentials: Arc::new(credentials),
        provider: Arc::new(MockFacebookProvider::new(args.frontend_url)),
        allowed_origins,
    };

    api::new(args.port, state).await
}

fn allowed_origins(args: &Args) -> Result<Vec<HeaderValue>> {
    if args.allowed_origins.is_empty() {
        return Ok(vec![api::frontend_origin(&args.frontend_url)?]);
    }
    args.allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin: {origin}"))
        })
        .collect()
}

fn log_startup_args(args: &Args) {
    let origins = if args.allowed_origins.is_empty() {
        "frontend origin".to_string()
    } else {
        args.allowed_origins.join(", ")
    };
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("data_dir", args.data_dir.display().to_string()),
        ("frontend_url", args.frontend_url.to_string()),
        ("allowed_origins", origins),
    ];
    log_entries("Startup configuration", &entries);
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn banner() -> String {
    format!(
        "{} {} - {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    )
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    trimmed.chars().take(7).collect()
}
