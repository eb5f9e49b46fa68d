// src/posts/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Post document. `owner_id` is always the owner's internal user id.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub owner_id: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub likes: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, FromRow)]
pub struct PostRow {
    pub id: String,
    pub owner_id: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub likes: String, // JSON array of internal user ids
    pub created_at: String,
    pub updated_at: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            description: row.description,
            image: row.image,
            likes: serde_json::from_str(&row.likes).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Post {
    /// Flip `user_id`'s membership in the like set
    pub fn toggle_like(&mut self, user_id: &str) -> LikeOutcome {
        if self.likes.iter().any(|id| id == user_id) {
            self.likes.retain(|id| id != user_id);
            LikeOutcome::Disliked
        } else {
            self.likes.push(user_id.to_string());
            LikeOutcome::Liked
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeOutcome {
    Liked,
    Disliked,
}

impl LikeOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            LikeOutcome::Liked => "The post has been liked",
            LikeOutcome::Disliked => "The post has been disliked",
        }
    }
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub status: LikeOutcome,
    pub message: String,
}

/// POST /api/posts body. Legacy field names are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(alias = "userId")]
    pub owner_id: Option<String>,
    #[serde(alias = "desc")]
    pub description: Option<String>,
    #[serde(alias = "img")]
    pub image: Option<String>,
}

/// PUT /api/posts/:id body. Ownership and likes are not editable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(alias = "desc")]
    pub description: Option<String>,
    #[serde(alias = "img")]
    pub image: Option<String>,
}
