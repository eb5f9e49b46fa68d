// src/posts/repository.rs
//! Post persistence port and its SQLite implementation.

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

use super::models::{LikeOutcome, Post, PostRow, UpdatePostRequest};
use crate::common::transaction::ImmediateTransaction;
use crate::common::{now_timestamp, ApiError};

const POST_COLUMNS: &str = "id, owner_id, description, image, likes, created_at, updated_at";

/// Port for post persistence
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: &Post) -> Result<(), ApiError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, ApiError>;

    /// Posts of one owner, oldest first
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Post>, ApiError>;

    async fn find_all(&self) -> Result<Vec<Post>, ApiError>;

    /// Returns whether a record matched
    async fn update_content(&self, id: &str, update: &UpdatePostRequest)
        -> Result<bool, ApiError>;

    /// Returns whether a record was removed
    async fn delete(&self, id: &str) -> Result<bool, ApiError>;

    /// Atomically flip `user_id` in the like set; `None` when the post is missing
    async fn toggle_like(&self, id: &str, user_id: &str)
        -> Result<Option<LikeOutcome>, ApiError>;
}

pub struct SqlitePostRepository {
    db: SqlitePool,
}

impl SqlitePostRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

async fn toggle_like_locked(
    conn: &mut SqliteConnection,
    id: &str,
    user_id: &str,
) -> Result<Option<LikeOutcome>, ApiError> {
    let row = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {} FROM posts WHERE id = ?",
        POST_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(ApiError::DatabaseError)?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut post = Post::from(row);
    let outcome = post.toggle_like(user_id);
    let likes = serde_json::to_string(&post.likes)
        .map_err(|e| ApiError::InternalServer(e.to_string()))?;

    // Likes are not content; updated_at is left alone
    sqlx::query("UPDATE posts SET likes = ? WHERE id = ?")
        .bind(likes)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Some(outcome))
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn insert(&self, post: &Post) -> Result<(), ApiError> {
        let likes = serde_json::to_string(&post.likes)
            .map_err(|e| ApiError::InternalServer(e.to_string()))?;

        sqlx::query(&format!(
            "INSERT INTO posts ({}) VALUES (?, ?, ?, ?, ?, ?, ?)",
            POST_COLUMNS
        ))
        .bind(&post.id)
        .bind(&post.owner_id)
        .bind(&post.description)
        .bind(&post.image)
        .bind(likes)
        .bind(&post.created_at)
        .bind(&post.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::from_insert(e, "Post already exists"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, ApiError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE id = ?",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(row.map(Post::from))
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Post>, ApiError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE owner_id = ? ORDER BY created_at ASC, rowid ASC",
            POST_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_all(&self) -> Result<Vec<Post>, ApiError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts ORDER BY created_at ASC, rowid ASC",
            POST_COLUMNS
        ))
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn update_content(
        &self,
        id: &str,
        update: &UpdatePostRequest,
    ) -> Result<bool, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET description = COALESCE(?, description),
                image = COALESCE(?, image),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.description)
        .bind(&update.image)
        .bind(now_timestamp())
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_like(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<LikeOutcome>, ApiError> {
        let mut tx = ImmediateTransaction::begin(&self.db).await?;
        let result = toggle_like_locked(tx.conn()?, id, user_id).await;
        tx.finish(result).await
    }
}
