//! # Webhooks Module
//!
//! Keeps the identity store in sync with the identity provider through signed
//! `user.created` / `user.updated` / `user.deleted` events.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod verifier;


pub use routes::webhooks_routes;
pub use verifier::WebhookVerifier;
