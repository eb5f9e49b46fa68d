use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use super::handlers;

/// - `POST /api/upload` - Multipart upload, bounded by `max_upload_bytes`
/// - `GET /images/:filename` - Serve uploaded files
pub fn uploads_routes(max_upload_bytes: usize) -> Router {
    Router::new()
        .route(
            "/api/upload",
            post(handlers::upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/images/:filename", get(handlers::serve_image))
}
