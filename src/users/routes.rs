// src/users/routes.rs

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;

/// Creates the users router
///
/// # Routes
/// - `GET /api/users`, `GET /api/users/me` - Current user (protected)
/// - `GET /api/users/friends/:user_id` - Followings of a user, either id space
/// - `GET|PUT|DELETE /api/users/:id` - Lookup (public), edit and delete (owner or admin)
/// - `PUT /api/users/:id/follow`, `PUT /api/users/:id/unfollow` (protected)
pub fn users_routes() -> Router {
    Router::new()
        .route("/api/users", get(handlers::get_current_user))
        .route("/api/users/me", get(handlers::get_current_user))
        .route("/api/users/friends/:user_id", get(handlers::get_friends))
        .route(
            "/api/users/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/api/users/:id/follow", put(handlers::follow_user))
        .route("/api/users/:id/unfollow", put(handlers::unfollow_user))
}
