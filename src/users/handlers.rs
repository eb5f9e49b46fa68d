use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;
use tracing::info;

use super::models::{FriendSummary, Identifier, MessageResponse, ProfileUpdate, User};
use super::validators::ProfileUpdateValidator;
use crate::auth::{require_owner_or_override, Caller};
use crate::common::{ApiError, AppState, Validator};

/// GET /api/users/me (alias GET /api/users) - The caller's own record
pub async fn get_current_user(
    Extension(state): Extension<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<User>, ApiError> {
    let user = state.identity().resolve_by_internal_id(&caller.id).await?;
    Ok(Json(user))
}

/// GET /api/users/:id - Public lookup by internal id
pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state.identity().resolve_by_internal_id(&id).await?;
    Ok(Json(user))
}

/// PUT /api/users/:id - Owner or administrator only
pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    Json(request): Json<ProfileUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = state.identity();
    let target = identity.resolve_by_internal_id(&id).await?;
    require_owner_or_override(&target.id, &caller, "You can update only your account!")?;

    ProfileUpdateValidator.validate(&request).into_result()?;
    identity.update_profile(&target.id, &request).await?;

    Ok(Json(MessageResponse::new("Account has been updated")))
}

/// DELETE /api/users/:id - Owner or administrator only
pub async fn delete_user(
    Extension(state): Extension<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = state.identity();
    let target = identity.resolve_by_internal_id(&id).await?;
    require_owner_or_override(&target.id, &caller, "You can delete only your account!")?;

    identity.delete_by_internal_id(&target.id).await?;
    info!(user_id = %target.id, deleted_by = %caller.id, "Account deleted");

    Ok(Json(MessageResponse::new("Account has been deleted")))
}

/// PUT /api/users/:id/follow
pub async fn follow_user(
    Extension(state): Extension<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.graph().follow(&caller.id, &id).await?;
    Ok(Json(MessageResponse::new("User has been followed")))
}

/// PUT /api/users/:id/unfollow
pub async fn unfollow_user(
    Extension(state): Extension<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.graph().unfollow(&caller.id, &id).await?;
    Ok(Json(MessageResponse::new("User has been unfollowed")))
}

/// GET /api/users/friends/:user_id - Accepts either id space
pub async fn get_friends(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<FriendSummary>>, ApiError> {
    let friends = state
        .graph()
        .list_friends(&Identifier::parse(&user_id))
        .await?;
    Ok(Json(friends))
}
