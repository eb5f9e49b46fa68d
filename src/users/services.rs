// src/users/services.rs
//! Identity store: user records keyed by internal id and identity-provider id.

use std::sync::Arc;
use tracing::info;

use super::models::{Identifier, NewUser, ProfileUpdate, User};
use super::repository::UserRepository;
use crate::common::{email_local_part, generate_user_id, now_timestamp, safe_email_log, ApiError};

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

/// Username from the provider, or the local part of the email when absent
pub fn resolve_username(username: Option<&str>, email: &str) -> Option<String> {
    username
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .or_else(|| email_local_part(email))
        .map(str::to_string)
}

pub struct IdentityService {
    users: Arc<dyn UserRepository>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn resolve_by_external_id(&self, external_id: &str) -> Result<User, ApiError> {
        self.users
            .find(&Identifier::External(external_id.to_string()))
            .await?
            .ok_or_else(user_not_found)
    }

    pub async fn resolve_by_internal_id(&self, id: &str) -> Result<User, ApiError> {
        self.users
            .find(&Identifier::Internal(id.to_string()))
            .await?
            .ok_or_else(user_not_found)
    }

    /// Internal identifiers are tried in the internal space first, then as an
    /// external id. External identifiers only resolve externally.
    pub async fn resolve(&self, who: &Identifier) -> Result<User, ApiError> {
        if let Some(user) = self.users.find(who).await? {
            return Ok(user);
        }

        match who {
            Identifier::Internal(raw) => self.resolve_by_external_id(raw).await,
            Identifier::External(_) => Err(user_not_found()),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, ApiError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(user_not_found)
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User, ApiError> {
        let username = resolve_username(new_user.username.as_deref(), &new_user.email)
            .ok_or_else(|| ApiError::BadRequest("username or email required".to_string()))?;

        let external = Identifier::External(new_user.external_id.clone());
        if self.users.find(&external).await?.is_some() {
            return Err(ApiError::Conflict("User already exists".to_string()));
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(ApiError::Conflict("Username already taken".to_string()));
        }

        let now = now_timestamp();
        let user = User {
            id: generate_user_id(),
            external_id: new_user.external_id,
            username,
            email: new_user.email,
            profile_picture: new_user.profile_picture,
            password: None,
            followers: Vec::new(),
            followings: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        self.users.insert(&user).await?;

        info!(
            user_id = %user.id,
            external_id = %user.external_id,
            email = %safe_email_log(&user.email),
            "User created"
        );

        Ok(user)
    }

    /// Provider-driven update. No matching record is a successful no-op.
    pub async fn update_by_external_id(
        &self,
        external_id: &str,
        update: &ProfileUpdate,
    ) -> Result<bool, ApiError> {
        let who = Identifier::External(external_id.to_string());
        self.ensure_username_free(&who, update).await?;
        let updated = self.users.update_profile(&who, update).await?;
        info!(external_id = %external_id, matched = updated, "User update from identity provider");
        Ok(updated)
    }

    /// Profile edit on an existing internal record
    pub async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> Result<(), ApiError> {
        let who = Identifier::Internal(id.to_string());
        self.ensure_username_free(&who, update).await?;
        if !self.users.update_profile(&who, update).await? {
            return Err(user_not_found());
        }
        info!(user_id = %id, "User profile updated");
        Ok(())
    }

    /// Idempotent
    pub async fn delete_by_external_id(&self, external_id: &str) -> Result<(), ApiError> {
        let removed = self
            .users
            .delete(&Identifier::External(external_id.to_string()))
            .await?;
        info!(external_id = %external_id, removed = removed, "User delete from identity provider");
        Ok(())
    }

    pub async fn delete_by_internal_id(&self, id: &str) -> Result<(), ApiError> {
        if !self
            .users
            .delete(&Identifier::Internal(id.to_string()))
            .await?
        {
            return Err(user_not_found());
        }
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn ensure_username_free(
        &self,
        who: &Identifier,
        update: &ProfileUpdate,
    ) -> Result<(), ApiError> {
        let Some(username) = &update.username else {
            return Ok(());
        };

        match self.users.find_by_username(username).await? {
            Some(holder) if holder_matches(&holder, who) => Ok(()),
            Some(_) => Err(ApiError::Conflict("Username already taken".to_string())),
            None => Ok(()),
        }
    }
}

fn holder_matches(user: &User, who: &Identifier) -> bool {
    match who {
        Identifier::Internal(id) => &user.id == id,
        Identifier::External(id) => &user.external_id == id,
    }
}
