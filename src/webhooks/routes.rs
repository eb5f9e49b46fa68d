use axum::{routing::post, Router};

use super::handlers;

/// - `POST /api/webhooks/clerk` - Signed user lifecycle events from the identity provider
pub fn webhooks_routes() -> Router {
    Router::new().route("/api/webhooks/clerk", post(handlers::clerk_webhook))
}
