use crate::cli::{
    actions::{server::Args, Action},
    commands::{ARG_ALLOWED_ORIGINS, ARG_FRONTEND_URL},
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use url::Url;

/// # Errors
/// Returns an error if required arguments are missing or the frontend URL is invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(4000);
    let data_dir = matches
        .get_one::<String>("data-dir")
        .map(PathBuf::from)
        .context("missing required argument: --data-dir")?;

    let frontend_url = matches
        .get_one::<String>(ARG_FRONTEND_URL)
        .context("missing required argument: --frontend-url")?;
    let frontend_url = Url::parse(frontend_url).context("invalid FLATAUTH_FRONTEND_URL")?;

    let allowed_origins = matches
        .get_many::<String>(ARG_ALLOWED_ORIGINS)
        .map(|values| {
            values
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(Action::Server(Args {
        port,
        data_dir,
        frontend_url,
        allowed_origins,
    }))
}
