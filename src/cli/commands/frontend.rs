use clap::{Arg, Command};

pub const ARG_FRONTEND_URL: &str = "frontend-url";
pub const ARG_ALLOWED_ORIGINS: &str = "allowed-origins";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FRONTEND_URL)
                .long("frontend-url")
                .help("Frontend base URL, used for provider redirects")
                .default_value("http://localhost:5173")
                .env("FLATAUTH_FRONTEND_URL"),
        )
        .arg(
            Arg::new(ARG_ALLOWED_ORIGINS)
                .long("allowed-origins")
                .help("Comma separated CORS origins (default: the frontend origin)")
                .env("FLATAUTH_ALLOWED_ORIGINS")
                .value_delimiter(','),
        )
}
