//! End-to-end tests for the HTTP surface.
//!
//! Every test builds the full application router over a fresh temporary data
//! directory and drives it with `oneshot` requests, then inspects both the
//! responses and the JSON document left on disk.

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, LOCATION, ORIGIN},
        HeaderValue, Request, Response, StatusCode,
    },
    Router,
};
use flatauth::{
    activity::RecordingActivitySink,
    api::{self, AppState},
    auth::{Argon2Hasher, CredentialService},
    provider::MockFacebookProvider,
    store::UserStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;

const FRONTEND: &str = "http://localhost:5173";

struct TestContext {
    dir: TempDir,
    activity: RecordingActivitySink,
    app: Router,
}

impl TestContext {
    fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let activity = RecordingActivitySink::new();
        let hasher = Argon2Hasher::new(
            argon2::Params::new(1024, 1, 1, None).map_err(|err| anyhow::anyhow!("{err}"))?,
        );

        let credentials = CredentialService::new(
            Arc::new(UserStore::in_dir(dir.path())),
            Arc::new(hasher),
            Arc::new(activity.clone()),
        );
        let frontend = Url::parse(FRONTEND)?;

        let app = api::app(AppState {
            credentials: Arc::new(credentials),
            allowed_origins: vec![api::frontend_origin(&frontend)?],
            provider: Arc::new(MockFacebookProvider::new(frontend)),
        });

        Ok(Self { dir, activity, app })
    }

    async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        Ok(self.app.clone().oneshot(request).await?)
    }

    async fn post_json(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        let response = self
            .send(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))?,
            )
            .await?;
        let status = response.status();
        Ok((status, json_body(response).await?))
    }

    async fn get(&self, uri: &str) -> Result<Response<Body>> {
        self.send(Request::builder().uri(uri).body(Body::empty())?)
            .await
    }

    fn users(&self) -> Result<Vec<Value>> {
        let raw = std::fs::read_to_string(self.dir.path().join("users.json"))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

async fn json_body(response: Response<Body>) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn text_body(response: Response<Body>) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn location(response: &Response<Body>) -> Result<&str> {
    Ok(response
        .headers()
        .get(LOCATION)
        .context("missing Location header")?
        .to_str()?)
}

#[tokio::test]
async fn signup_login_and_provider_flow() -> Result<()> {
    let ctx = TestContext::new()?;

    let (status, body) = ctx
        .post_json("/api/signup", json!({"email": "x@y.com", "password": "pw"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Signup successful", "email": "x@y.com"})
    );

    let (status, body) = ctx
        .post_json("/api/login", json!({"email": "x@y.com", "password": "pw"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["email"], "x@y.com");

    let (status, body) = ctx
        .post_json("/api/login", json!({"email": "x@y.com", "password": "wrong"}))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({"success": false, "message": "Invalid credentials"})
    );

    let before = ctx.users()?;

    let response = ctx.get("/mock-facebook-success?email=x@y.com").await?;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response)?,
        "http://localhost:5173/facebook-success?email=x%40y.com"
    );

    // An existing record is left untouched by a provider login.
    assert_eq!(ctx.users()?, before);

    assert_eq!(
        ctx.activity.actions(),
        vec!["signup", "login", "login_failed", "provider_login"]
    );
    Ok(())
}

#[tokio::test]
async fn signup_stores_normalized_identifier_and_hashed_password() -> Result<()> {
    let ctx = TestContext::new()?;

    let (status, body) = ctx
        .post_json(
            "/api/signup",
            json!({"email": "  Alice@Example.COM ", "phone": "555-0100", "password": "p1"}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");

    let users = ctx.users()?;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "alice@example.com");
    assert_eq!(users[0]["phone"], "555-0100");
    let password = users[0]["password"].as_str().context("password stored")?;
    assert!(password.starts_with("$argon2id$"));
    assert!(users[0]["createdAt"].as_str().is_some());

    // Login normalizes the same way.
    let (status, _) = ctx
        .post_json("/api/login", json!({"email": "ALICE@example.com", "password": "p1"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn signup_with_phone_only() -> Result<()> {
    let ctx = TestContext::new()?;

    let (status, body) = ctx
        .post_json("/api/signup", json!({"phone": "555-0100", "password": "p1"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "555-0100");
    assert_eq!(ctx.users()?[0]["email"], "555-0100");
    Ok(())
}

#[tokio::test]
async fn duplicate_signup_is_rejected() -> Result<()> {
    let ctx = TestContext::new()?;

    let (status, _) = ctx
        .post_json("/api/signup", json!({"email": "a@b.com", "password": "p1"}))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .post_json("/api/signup", json!({"email": "A@B.com ", "password": "p2"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "message": "User already exists"})
    );
    assert_eq!(ctx.users()?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn missing_fields_are_validation_errors() -> Result<()> {
    let ctx = TestContext::new()?;

    let (status, body) = ctx
        .post_json("/api/signup", json!({"email": "a@b.com"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email/phone and password required");

    let (status, body) = ctx
        .post_json("/api/signup", json!({"password": "p1"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email/phone and password required");

    let (status, body) = ctx
        .post_json("/api/login", json!({"email": "a@b.com", "password": ""}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email and password required");

    // No body at all is treated like an empty request.
    let response = ctx
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/login")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await?["success"], false);
    Ok(())
}

#[tokio::test]
async fn unknown_user_and_provider_user_cannot_log_in() -> Result<()> {
    let ctx = TestContext::new()?;

    let (status, _) = ctx
        .post_json("/api/login", json!({"email": "nobody@b.com", "password": "p1"}))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = ctx.get("/mock-facebook-success?email=fb@b.com").await?;
    assert_eq!(response.status(), StatusCode::FOUND);

    let (status, _) = ctx
        .post_json("/api/login", json!({"email": "fb@b.com", "password": "anything"}))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_always_succeeds() -> Result<()> {
    let ctx = TestContext::new()?;

    let (status, body) = ctx
        .post_json("/api/logout", json!({"email": "a@b.com"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Logged out successfully"})
    );

    let response = ctx
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/logout")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?["success"], true);
    Ok(())
}

#[tokio::test]
async fn provider_callback_creates_passwordless_user_once() -> Result<()> {
    let ctx = TestContext::new()?;

    let response = ctx.get("/api/mock-facebook-success").await?;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response)?,
        "http://localhost:5173/facebook-success?email=mockuser%40facebook.com"
    );

    let response = ctx.get("/mock-facebook-success?email=").await?;
    assert_eq!(response.status(), StatusCode::FOUND);

    let response = ctx.get("/mock-facebook-success?email=A%20B%40c.com").await?;
    assert_eq!(
        location(&response)?,
        "http://localhost:5173/facebook-success?email=a%20b%40c.com"
    );

    let users = ctx.users()?;
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], "mockuser@facebook.com");
    assert_eq!(users[0]["password"], Value::Null);
    assert_eq!(users[1]["email"], "a b@c.com");
    Ok(())
}

#[tokio::test]
async fn consent_page_is_served_on_both_paths() -> Result<()> {
    let ctx = TestContext::new()?;

    for path in ["/auth/facebook", "/provider/login"] {
        let response = ctx.get(path).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .context("missing content type")?
            .to_str()?
            .to_string();
        assert!(content_type.starts_with("text/html"));

        let html = text_body(response).await?;
        assert!(html.contains("action=\"/mock-facebook-success\""));
        assert!(html.contains("name=\"email\""));
        assert!(html.contains("name=\"password\""));
    }
    Ok(())
}

#[tokio::test]
async fn root_health_and_openapi() -> Result<()> {
    let ctx = TestContext::new()?;

    let response = ctx.get("/").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text_body(response).await?.contains("backend running"));

    // The store file does not exist until the first write.
    let response = ctx.get("/health").await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    ctx.post_json("/api/signup", json!({"email": "a@b.com", "password": "p1"}))
        .await?;
    let response = ctx.get("/health").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-App"));

    let response = ctx.get("/openapi.json").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await?;
    for path in [
        "/api/signup",
        "/api/login",
        "/api/logout",
        "/auth/facebook",
        "/mock-facebook-success",
        "/health",
    ] {
        assert!(doc["paths"].get(path).is_some(), "missing {path}");
    }
    Ok(())
}

#[tokio::test]
async fn request_id_and_cors_headers() -> Result<()> {
    let ctx = TestContext::new()?;

    let response = ctx
        .send(
            Request::builder()
                .uri("/")
                .header("x-request-id", "req-123")
                .header(ORIGIN, FRONTEND)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(
        response.headers().get("x-request-id"),
        Some(&HeaderValue::from_static("req-123"))
    );
    assert_eq!(
        response.headers().get("access-control-allow-origin"),
        Some(&HeaderValue::from_static(FRONTEND))
    );

    let response = ctx.get("/").await?;
    let generated = response
        .headers()
        .get("x-request-id")
        .context("request id generated")?
        .to_str()?;
    assert_eq!(generated.len(), 26);

    let response = ctx
        .send(
            Request::builder()
                .uri("/")
                .header(ORIGIN, "http://evil.example")
                .body(Body::empty())?,
        )
        .await?;
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
    Ok(())
}
