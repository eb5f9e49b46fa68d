//! Authentication extractors for Axum
//!
//! `AuthedUser` only proves the request carries a verified identity-provider id.
//! `Caller` additionally resolves that id to the internal user record, once per
//! request; everything downstream works with internal ids only.

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::common::{safe_email_log, ApiError, AppState};

/// Cookie the identity provider stores its session token in
const SESSION_COOKIE: &str = "__session";

/// A request whose identity-provider token has been verified
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub external_id: String,
}

/// The authenticated caller resolved to an internal user record
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: String,
    pub external_id: String,
    pub email: String,
    pub is_admin: bool,
}

/// Pull the raw session token from `Authorization` (with or without `Bearer `),
/// falling back to the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Require a verified external identity on the request.
pub fn require_authenticated(headers: &HeaderMap, state: &AppState) -> Result<AuthedUser, ApiError> {
    if state.dev_mode.is_enabled() {
        debug!(external_id = %state.dev_mode.external_id, "DEV MODE: Authentication bypassed");
        return Ok(AuthedUser {
            external_id: state.dev_mode.external_id.clone(),
        });
    }

    let token = extract_token(headers).ok_or_else(|| {
        warn!("Authentication failed: missing session token");
        ApiError::Unauthorized("Unauthorized".into())
    })?;

    let claims = state.token_verifier.verify(&token).map_err(|e| {
        warn!(error = %e, "Session token validation failed");
        ApiError::Unauthorized("invalid token".into())
    })?;

    Ok(AuthedUser {
        external_id: claims.sub,
    })
}

/// Convert an external id into the caller's internal record and server-side role.
pub async fn resolve_caller_identity(
    state: &AppState,
    authed: &AuthedUser,
) -> Result<Caller, ApiError> {
    let user = state
        .identity()
        .resolve_by_external_id(&authed.external_id)
        .await?;

    let is_admin = state.admin_emails.contains(&user.email.to_lowercase())
        || (state.dev_mode.is_enabled() && state.dev_mode.user_is_admin);

    debug!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        is_admin = is_admin,
        "Caller resolved"
    );

    Ok(Caller {
        id: user.id,
        external_id: user.external_id,
        email: user.email,
        is_admin,
    })
}

async fn app_state<S>(parts: &mut Parts, state: &S) -> Result<Arc<AppState>, ApiError>
where
    S: Send + Sync,
{
    let Extension(app_state): Extension<Arc<AppState>> =
        Extension::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;
    Ok(app_state)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = app_state(parts, state).await?;
        require_authenticated(&parts.headers, &app_state)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = app_state(parts, state).await?;
        let authed = require_authenticated(&parts.headers, &app_state)?;
        resolve_caller_identity(&app_state, &authed).await
    }
}
