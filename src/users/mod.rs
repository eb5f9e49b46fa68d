//! # Users Module
//!
//! - Identity store: records keyed by internal id and identity-provider id
//! - Relationship graph: symmetric follower/following edges
//! - Profile, follow and friends endpoints

pub mod graph;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod validators;


pub use graph::RelationshipGraph;
pub use models::{Identifier, MessageResponse, User};
pub use repository::{SqliteUserRepository, UserRepository};
pub use routes::users_routes;
pub use services::IdentityService;
