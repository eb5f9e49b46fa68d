// src/users/graph.rs
//! Follower/following edges between users.
//!
//! An edge A -> B is stored twice: B in `A.followings` and A in `B.followers`.
//! `apply_edge_change` is the pure rule set; repositories call it inside a single
//! transaction so both sides are written or neither is.

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::info;

use super::models::{FriendSummary, Identifier, User};
use super::repository::UserRepository;
use super::services::IdentityService;
use crate::common::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeChange {
    Follow,
    Unfollow,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EdgeError {
    #[error("You cannot follow yourself")]
    SelfFollow,

    #[error("You cannot unfollow yourself")]
    SelfUnfollow,

    #[error("You already follow this user")]
    AlreadyFollowing,

    #[error("You don't follow this user")]
    NotFollowing,
}

impl From<EdgeError> for ApiError {
    fn from(e: EdgeError) -> Self {
        ApiError::Forbidden(e.to_string())
    }
}

/// Rejects self-references for the given change
pub fn check_not_self(actor_id: &str, target_id: &str, change: EdgeChange) -> Result<(), EdgeError> {
    if actor_id != target_id {
        return Ok(());
    }
    Err(match change {
        EdgeChange::Follow => EdgeError::SelfFollow,
        EdgeChange::Unfollow => EdgeError::SelfUnfollow,
    })
}

/// Apply a follow or unfollow to both documents in memory.
///
/// The edge is considered present when the actor is in the target's followers.
/// Following also repairs a half-written edge left by older data.
pub fn apply_edge_change(
    actor: &mut User,
    target: &mut User,
    change: EdgeChange,
) -> Result<(), EdgeError> {
    check_not_self(&actor.id, &target.id, change)?;

    let present = target.followers.contains(&actor.id);
    match change {
        EdgeChange::Follow => {
            if present {
                return Err(EdgeError::AlreadyFollowing);
            }
            target.followers.push(actor.id.clone());
            if !actor.followings.contains(&target.id) {
                actor.followings.push(target.id.clone());
            }
        }
        EdgeChange::Unfollow => {
            if !present {
                return Err(EdgeError::NotFollowing);
            }
            target.followers.retain(|id| id != &actor.id);
            actor.followings.retain(|id| id != &target.id);
        }
    }
    Ok(())
}

/// Relationship operations over the user repository
pub struct RelationshipGraph {
    users: Arc<dyn UserRepository>,
}

impl RelationshipGraph {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn follow(&self, actor_id: &str, target_id: &str) -> Result<(), ApiError> {
        check_not_self(actor_id, target_id, EdgeChange::Follow)?;
        self.users
            .apply_edge(actor_id, target_id, EdgeChange::Follow)
            .await?;
        info!(actor_id = %actor_id, target_id = %target_id, "User followed");
        Ok(())
    }

    pub async fn unfollow(&self, actor_id: &str, target_id: &str) -> Result<(), ApiError> {
        check_not_self(actor_id, target_id, EdgeChange::Unfollow)?;
        self.users
            .apply_edge(actor_id, target_id, EdgeChange::Unfollow)
            .await?;
        info!(actor_id = %actor_id, target_id = %target_id, "User unfollowed");
        Ok(())
    }

    /// Users `who` follows, in followings order. Followings whose record no longer
    /// exists are skipped.
    pub async fn list_friends(&self, who: &Identifier) -> Result<Vec<FriendSummary>, ApiError> {
        let user = IdentityService::new(self.users.clone()).resolve(who).await?;

        let lookups = user.followings.iter().map(|friend_id| {
            let users = self.users.clone();
            async move { users.find(&Identifier::Internal(friend_id.clone())).await }
        });
        let friends = try_join_all(lookups).await?;

        Ok(friends
            .iter()
            .flatten()
            .map(FriendSummary::from)
            .collect())
    }
}
