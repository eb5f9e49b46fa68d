// src/users/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::id_generator::{is_generated_id, EntityPrefix};

/// User document.
///
/// `id` is the only key used for relationships and ownership. `external_id` exists
/// solely to resolve authenticated requests. `password` and `updated_at` are never
/// serialized into responses.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub external_id: String,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub followers: Vec<String>,
    pub followings: Vec<String>,
    pub created_at: String,
    #[serde(skip_serializing)]
    pub updated_at: String,
}

/// Row as stored; list fields are JSON arrays in TEXT columns
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: String,
    pub external_id: String,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub password: Option<String>,
    pub followers: String,
    pub followings: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            external_id: row.external_id,
            username: row.username,
            email: row.email,
            profile_picture: row.profile_picture,
            password: row.password,
            followers: serde_json::from_str(&row.followers).unwrap_or_default(),
            followings: serde_json::from_str(&row.followings).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A reference to a user in either id space, classified once at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Internal(String),
    External(String),
}

impl Identifier {
    /// Strings shaped like a generated user id are internal, anything else is
    /// treated as an identity-provider id.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if is_generated_id(EntityPrefix::User, raw) {
            Identifier::Internal(raw.to_string())
        } else {
            Identifier::External(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Identifier::Internal(id) | Identifier::External(id) => id,
        }
    }

    /// Column this identifier is looked up by
    pub fn column(&self) -> &'static str {
        match self {
            Identifier::Internal(_) => "id",
            Identifier::External(_) => "external_id",
        }
    }
}

/// Input for creating a user from an identity-provider event
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: String,
    pub username: Option<String>,
    pub email: String,
    pub profile_picture: Option<String>,
}

/// Partial profile update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_picture: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.profile_picture.is_none()
    }
}

/// Entry of a user's friends list
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FriendSummary {
    pub id: String,
    pub username: String,
    pub profile_picture: Option<String>,
}

impl From<&User> for FriendSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            profile_picture: user.profile_picture.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
