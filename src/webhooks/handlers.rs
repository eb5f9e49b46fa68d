use axum::{body::Bytes, extract::Extension, http::HeaderMap, Json};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::models::{ClerkEvent, UserEvent, WebhookResponse};
use super::verifier::SignatureHeaders;
use crate::common::{ApiError, AppState};
use crate::users::IdentityService;

/// POST /api/webhooks/clerk
///
/// One-shot per delivery: a failure returns an error status and the event is
/// dropped. The raw body is required for signature verification.
pub async fn clerk_webhook(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let verifier = state.webhook_verifier.as_ref().ok_or_else(|| {
        error!("CLERK_WEBHOOK_SECRET is not configured; rejecting webhook");
        ApiError::InternalServer("webhook secret not configured".to_string())
    })?;

    let signature = SignatureHeaders::from_headers(&headers).map_err(|_| {
        warn!("Webhook rejected: missing svix headers");
        ApiError::BadRequest("Error occured -- no svix headers".to_string())
    })?;

    verifier.verify(&signature, &body).map_err(|e| {
        warn!(error = %e, svix_id = %signature.id, "Error verifying webhook");
        ApiError::BadRequest("Error occured".to_string())
    })?;

    let event: ClerkEvent = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, svix_id = %signature.id, "Webhook payload is not a valid event");
        ApiError::BadRequest("malformed event payload".to_string())
    })?;

    info!(
        svix_id = %signature.id,
        event_type = %event.event_type,
        external_id = ?event.data.id,
        "Webhook received"
    );

    apply_user_event(&state.identity(), event.into_user_event()?).await?;

    Ok(Json(WebhookResponse {
        success: true,
        message: "Webhook received".to_string(),
    }))
}

/// Mutate the identity store according to a verified event
pub async fn apply_user_event(
    identity: &IdentityService,
    event: UserEvent,
) -> Result<(), ApiError> {
    match event {
        UserEvent::Created(new_user) => {
            identity.create(new_user).await?;
        }
        UserEvent::Updated {
            external_id,
            update,
        } => {
            identity.update_by_external_id(&external_id, &update).await?;
        }
        UserEvent::Deleted { external_id } => {
            identity.delete_by_external_id(&external_id).await?;
        }
        UserEvent::Ignored(event_type) => {
            info!(event_type = %event_type, "Ignoring unhandled webhook event type");
        }
    }
    Ok(())
}
