// src/users/repository.rs
//! User persistence port and its SQLite implementation.

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::error;

use super::graph::{apply_edge_change, EdgeChange};
use super::models::{Identifier, ProfileUpdate, User, UserRow};
use crate::common::transaction::ImmediateTransaction;
use crate::common::{now_timestamp, ApiError};

const USER_COLUMNS: &str = "id, external_id, username, email, profile_picture, password, \
                            followers, followings, created_at, updated_at";

/// Port for user persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exact lookup in the identifier's own id space
    async fn find(&self, who: &Identifier) -> Result<Option<User>, ApiError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    /// Fails with `Conflict` when the external id or username is taken
    async fn insert(&self, user: &User) -> Result<(), ApiError>;

    /// Returns whether a record matched
    async fn update_profile(
        &self,
        who: &Identifier,
        update: &ProfileUpdate,
    ) -> Result<bool, ApiError>;

    /// Returns whether a record was removed
    async fn delete(&self, who: &Identifier) -> Result<bool, ApiError>;

    /// Read both users, apply the edge rules and write both sides atomically
    async fn apply_edge(
        &self,
        actor_id: &str,
        target_id: &str,
        change: EdgeChange,
    ) -> Result<(), ApiError>;
}

pub struct SqliteUserRepository {
    db: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

async fn fetch_by_id(conn: &mut SqliteConnection, id: &str) -> Result<Option<User>, ApiError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(row.map(User::from))
}

async fn write_edges(conn: &mut SqliteConnection, user: &User, now: &str) -> Result<(), ApiError> {
    let followers = serde_json::to_string(&user.followers)
        .map_err(|e| ApiError::InternalServer(e.to_string()))?;
    let followings = serde_json::to_string(&user.followings)
        .map_err(|e| ApiError::InternalServer(e.to_string()))?;

    sqlx::query("UPDATE users SET followers = ?, followings = ?, updated_at = ? WHERE id = ?")
        .bind(followers)
        .bind(followings)
        .bind(now)
        .bind(&user.id)
        .execute(&mut *conn)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(())
}

/// Both users are read, checked and written on the same locked connection
async fn write_edge_change(
    conn: &mut SqliteConnection,
    actor_id: &str,
    target_id: &str,
    change: EdgeChange,
) -> Result<(), ApiError> {
    let mut actor = fetch_by_id(conn, actor_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let mut target = fetch_by_id(conn, target_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    apply_edge_change(&mut actor, &mut target, change)?;

    let now = now_timestamp();
    write_edges(conn, &actor, &now).await?;
    write_edges(conn, &target, &now).await
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find(&self, who: &Identifier) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE {} = ?",
            USER_COLUMNS,
            who.column()
        ))
        .bind(who.as_str())
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(row.map(User::from))
    }

    async fn insert(&self, user: &User) -> Result<(), ApiError> {
        let followers = serde_json::to_string(&user.followers)
            .map_err(|e| ApiError::InternalServer(e.to_string()))?;
        let followings = serde_json::to_string(&user.followings)
            .map_err(|e| ApiError::InternalServer(e.to_string()))?;

        sqlx::query(&format!(
            "INSERT INTO users ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            USER_COLUMNS
        ))
        .bind(&user.id)
        .bind(&user.external_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.profile_picture)
        .bind(&user.password)
        .bind(followers)
        .bind(followings)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::from_insert(e, "User already exists"))?;

        Ok(())
    }

    async fn update_profile(
        &self,
        who: &Identifier,
        update: &ProfileUpdate,
    ) -> Result<bool, ApiError> {
        let mut updates = Vec::new();
        let mut params: Vec<&str> = Vec::new();

        if let Some(username) = &update.username {
            updates.push("username = ?");
            params.push(username);
        }
        if let Some(email) = &update.email {
            updates.push("email = ?");
            params.push(email);
        }
        if let Some(profile_picture) = &update.profile_picture {
            updates.push("profile_picture = ?");
            params.push(profile_picture);
        }

        let now = now_timestamp();
        updates.push("updated_at = ?");
        params.push(&now);

        let sql = format!(
            "UPDATE users SET {} WHERE {} = ?",
            updates.join(", "),
            who.column()
        );

        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(param);
        }

        let result = query
            .bind(who.as_str())
            .execute(&self.db)
            .await
            .map_err(|e| ApiError::from_insert(e, "Username already taken"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, who: &Identifier) -> Result<bool, ApiError> {
        let result = sqlx::query(&format!("DELETE FROM users WHERE {} = ?", who.column()))
            .bind(who.as_str())
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(result.rows_affected() > 0)
    }

    async fn apply_edge(
        &self,
        actor_id: &str,
        target_id: &str,
        change: EdgeChange,
    ) -> Result<(), ApiError> {
        let mut tx = ImmediateTransaction::begin(&self.db).await?;
        let result = write_edge_change(tx.conn()?, actor_id, target_id, change).await;
        tx.finish(result).await.map_err(|e| {
            if matches!(e, ApiError::DatabaseError(_)) {
                error!(error = %e, actor_id = %actor_id, target_id = %target_id, "Failed to write follow edge");
            }
            e
        })
    }
}
