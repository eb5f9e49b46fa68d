// src/posts/routes.rs

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;

pub fn posts_routes() -> Router {
    Router::new()
        .route(
            "/api/posts",
            get(handlers::get_all_posts).post(handlers::create_post),
        )
        .route("/api/posts/timeline/me", get(handlers::get_my_timeline))
        .route(
            "/api/posts/timeline/:user_id",
            get(handlers::get_timeline_posts),
        )
        .route("/api/posts/profile/:username", get(handlers::get_user_posts))
        .route(
            "/api/posts/:id",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route("/api/posts/:id/like", put(handlers::like_post))
}
