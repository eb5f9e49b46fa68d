// src/posts/services.rs
//! Post store: creation, owner-gated mutation, like toggling.

use std::sync::Arc;
use tracing::{info, warn};

use super::models::{CreatePostRequest, LikeOutcome, Post, UpdatePostRequest};
use super::repository::PostRepository;
use crate::auth::{require_owner_or_override, Caller};
use crate::common::{generate_post_id, now_timestamp, ApiError};

fn post_not_found() -> ApiError {
    ApiError::NotFound("Post not found".to_string())
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// The owner is always the caller; a differing `ownerId` in the body is ignored.
    pub async fn create(
        &self,
        owner_id: &str,
        request: CreatePostRequest,
    ) -> Result<Post, ApiError> {
        if let Some(claimed) = request.owner_id.as_deref() {
            if claimed != owner_id {
                warn!(
                    owner_id = %owner_id,
                    claimed_owner_id = %claimed,
                    "Ignoring ownerId in post body that differs from the caller"
                );
            }
        }

        let now = now_timestamp();
        let post = Post {
            id: generate_post_id(),
            owner_id: owner_id.to_string(),
            description: request.description,
            image: request.image,
            likes: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        self.posts.insert(&post).await?;
        info!(post_id = %post.id, owner_id = %owner_id, "Post created");

        Ok(post)
    }

    pub async fn get(&self, id: &str) -> Result<Post, ApiError> {
        self.posts.find_by_id(id).await?.ok_or_else(post_not_found)
    }

    pub async fn list_all(&self) -> Result<Vec<Post>, ApiError> {
        self.posts.find_all().await
    }

    pub async fn update(
        &self,
        id: &str,
        caller: &Caller,
        update: &UpdatePostRequest,
    ) -> Result<(), ApiError> {
        let post = self.get(id).await?;
        require_owner_or_override(&post.owner_id, caller, "You can update only your post")?;

        if !self.posts.update_content(id, update).await? {
            return Err(post_not_found());
        }
        info!(post_id = %id, caller_id = %caller.id, "Post updated");
        Ok(())
    }

    pub async fn delete(&self, id: &str, caller: &Caller) -> Result<(), ApiError> {
        let post = self.get(id).await?;
        require_owner_or_override(&post.owner_id, caller, "You can delete only your post")?;

        if !self.posts.delete(id).await? {
            return Err(post_not_found());
        }
        info!(post_id = %id, caller_id = %caller.id, "Post deleted");
        Ok(())
    }

    pub async fn toggle_like(&self, id: &str, user_id: &str) -> Result<LikeOutcome, ApiError> {
        let outcome = self
            .posts
            .toggle_like(id, user_id)
            .await?
            .ok_or_else(post_not_found)?;
        info!(post_id = %id, user_id = %user_id, outcome = ?outcome, "Post like toggled");
        Ok(outcome)
    }
}
