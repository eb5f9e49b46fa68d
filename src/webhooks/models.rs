// src/webhooks/models.rs

use serde::{Deserialize, Serialize};

use crate::common::ApiError;
use crate::users::models::{NewUser, ProfileUpdate};
use crate::users::services::resolve_username;

/// Identity-provider event envelope
#[derive(Debug, Deserialize)]
pub struct ClerkEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: ClerkUserData,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClerkUserData {
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<ClerkEmailAddress>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClerkEmailAddress {
    #[serde(default)]
    pub id: Option<String>,
    pub email_address: String,
}

impl ClerkUserData {
    /// The primary address when flagged, otherwise the first one
    pub fn email(&self) -> Option<&str> {
        let primary = self.primary_email_address_id.as_deref().and_then(|primary| {
            self.email_addresses
                .iter()
                .find(|e| e.id.as_deref() == Some(primary))
        });

        primary
            .or_else(|| self.email_addresses.first())
            .map(|e| e.email_address.as_str())
    }
}

/// What an event means for the identity store
#[derive(Debug)]
pub enum UserEvent {
    Created(NewUser),
    Updated {
        external_id: String,
        update: ProfileUpdate,
    },
    Deleted {
        external_id: String,
    },
    Ignored(String),
}

impl ClerkEvent {
    pub fn into_user_event(self) -> Result<UserEvent, ApiError> {
        let event_type = self.event_type;
        let data = self.data;

        if !matches!(
            event_type.as_str(),
            "user.created" | "user.updated" | "user.deleted"
        ) {
            return Ok(UserEvent::Ignored(event_type));
        }

        let external_id = data
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("event is missing data.id".to_string()))?;

        if event_type == "user.deleted" {
            return Ok(UserEvent::Deleted { external_id });
        }

        let email = data
            .email()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("event has no email address".to_string()))?;

        if event_type == "user.created" {
            return Ok(UserEvent::Created(NewUser {
                external_id,
                username: data.username,
                email,
                profile_picture: data.image_url,
            }));
        }

        Ok(UserEvent::Updated {
            external_id,
            update: ProfileUpdate {
                username: resolve_username(data.username.as_deref(), &email),
                email: Some(email),
                profile_picture: data.image_url,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
}
