use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;

use super::models::{CreatePostRequest, LikeResponse, Post, UpdatePostRequest};
use crate::auth::Caller;
use crate::common::{ApiError, AppState};
use crate::users::{Identifier, MessageResponse};

/// POST /api/posts - Create a post owned by the caller
pub async fn create_post(
    Extension(state): Extension<Arc<AppState>>,
    caller: Caller,
    Json(request): Json<CreatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let post = state.post_store().create(&caller.id, request).await?;
    Ok(Json(post))
}

/// GET /api/posts - All posts
pub async fn get_all_posts(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.post_store().list_all().await?))
}

/// GET /api/posts/:id
pub async fn get_post(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.post_store().get(&id).await?))
}

/// PUT /api/posts/:id - Owner or administrator only
pub async fn update_post(
    Extension(state): Extension<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.post_store().update(&id, &caller, &request).await?;
    Ok(Json(MessageResponse::new("The post has been updated")))
}

/// DELETE /api/posts/:id - Owner or administrator only
pub async fn delete_post(
    Extension(state): Extension<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.post_store().delete(&id, &caller).await?;
    Ok(Json(MessageResponse::new("The post has been deleted")))
}

/// PUT /api/posts/:id/like - Toggle the caller's like
pub async fn like_post(
    Extension(state): Extension<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<LikeResponse>, ApiError> {
    let status = state.post_store().toggle_like(&id, &caller.id).await?;
    Ok(Json(LikeResponse {
        status,
        message: status.message().to_string(),
    }))
}

/// GET /api/posts/timeline/:user_id - Accepts either id space
pub async fn get_timeline_posts(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state
        .timeline()
        .get_timeline(&Identifier::parse(&user_id))
        .await?;
    Ok(Json(posts))
}

/// GET /api/posts/timeline/me - The caller's own timeline
pub async fn get_my_timeline(
    Extension(state): Extension<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state
        .timeline()
        .get_timeline(&Identifier::Internal(caller.id))
        .await?;
    Ok(Json(posts))
}

/// GET /api/posts/profile/:username
pub async fn get_user_posts(
    Extension(state): Extension<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.timeline().get_profile_feed(&username).await?))
}
