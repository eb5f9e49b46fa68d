//! Shared fixtures for in-module tests: in-memory and file-backed stores with the
//! real schema, seeded users, signed credentials and router plumbing.

use axum::{
    body::{to_bytes, Body},
    extract::Extension,
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use super::config::AppConfig;
use super::dev_mode::DevModeConfig;
use super::migrations::create_schema;
use super::state::AppState;
use crate::auth::models::Claims;
use crate::auth::Caller;
use crate::users::models::NewUser;
use crate::users::User;

pub const TEST_JWT_SECRET: &str = "test_secret_key";
pub const ADMIN_EMAIL: &str = "admin@example.com";

pub fn test_webhook_secret() -> String {
    format!("whsec_{}", STANDARD.encode(b"test-webhook-signing-key"))
}

/// Single never-recycled connection, since every `:memory:` connection is its own database
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite pool");
    create_schema(&pool).await.expect("schema");
    pool
}

/// On-disk database shared by `max_connections` connections, for tests that need
/// real lock contention
pub async fn file_pool(dir: &Path, max_connections: u32) -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(dir.join("social.db"))
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(30));
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .expect("file sqlite pool");
    create_schema(&pool).await.expect("schema");
    pool
}

pub async fn file_state(dir: &Path, max_connections: u32) -> AppState {
    let config = test_config(dir.join("images"));
    AppState::from_pool(file_pool(dir, max_connections).await, &config, DevModeConfig::default())
        .expect("test state")
}

pub fn test_config(images_dir: PathBuf) -> AppConfig {
    let mut admin_emails = HashSet::new();
    admin_emails.insert(ADMIN_EMAIL.to_string());

    AppConfig {
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        images_dir,
        jwt_secret: Some(TEST_JWT_SECRET.to_string()),
        clerk_jwt_key: None,
        clerk_webhook_secret: Some(test_webhook_secret()),
        admin_emails,
        cors_origins: Vec::new(),
        max_upload_bytes: 1024 * 1024,
    }
}

pub async fn memory_state() -> AppState {
    let config = test_config(std::env::temp_dir().join("social_api_test_images"));
    AppState::from_pool(memory_pool().await, &config, DevModeConfig::default())
        .expect("test state")
}

/// Creates a user through the identity store with email `<username>@example.com`
pub async fn seed_user(state: &AppState, external_id: &str, username: &str) -> User {
    seed_user_with_email(state, external_id, username, &format!("{}@example.com", username)).await
}

pub async fn seed_user_with_email(
    state: &AppState,
    external_id: &str,
    username: &str,
    email: &str,
) -> User {
    state
        .identity()
        .create(NewUser {
            external_id: external_id.to_string(),
            username: Some(username.to_string()),
            email: email.to_string(),
            profile_picture: None,
        })
        .await
        .expect("seed user")
}

pub fn caller_for(user: &User, is_admin: bool) -> Caller {
    Caller {
        id: user.id.clone(),
        external_id: user.external_id.clone(),
        email: user.email.clone(),
        is_admin,
    }
}

/// HS256 session token for `external_id`, valid far into the future
pub fn session_token(external_id: &str) -> String {
    let claims = Claims {
        sub: external_id.to_string(),
        exp: 9_999_999_999,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("encode token")
}

pub fn with_state(router: Router, state: AppState) -> Router {
    router.layer(Extension(Arc::new(state)))
}

/// Request with an optional bearer token and JSON body
pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request")
}

/// Runs one request through `app`; the body is parsed as JSON, `Null` when empty
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON response body")
    };
    (status, json)
}
