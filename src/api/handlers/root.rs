use axum::response::IntoResponse;

const BANNER: &str = concat!(
    env!("CARGO_PKG_NAME"),
    " ",
    env!("CARGO_PKG_VERSION"),
    " backend running"
);

// liveness banner, not documented in OpenAPI
pub async fn root() -> impl IntoResponse {
    BANNER
}
