//! # Auth Module
//!
//! The authorization gate in front of every mutation:
//! - identity-provider session token verification
//! - `AuthedUser` / `Caller` extractors for protected routes
//! - the owner-or-override rule

pub mod extractors;
pub mod gate;
pub mod models;

#[cfg(test)]
mod tests;

pub use extractors::{AuthedUser, Caller};
pub use gate::require_owner_or_override;
pub use models::TokenVerifier;
