//! # Posts Module
//!
//! - Post store: owner-gated create/update/delete and like toggling
//! - Timeline aggregation over a user and their followings
//! - Profile feed by username

pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod timeline;

#[cfg(test)]
mod tests;

pub use repository::{PostRepository, SqlitePostRepository};
pub use routes::posts_routes;
pub use services::PostService;
pub use timeline::TimelineService;
