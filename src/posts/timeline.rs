// src/posts/timeline.rs
//! Feed composition across a user and the users they follow.

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::debug;

use super::models::Post;
use super::repository::PostRepository;
use crate::common::ApiError;
use crate::users::{Identifier, IdentityService, UserRepository};

pub struct TimelineService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl TimelineService {
    pub fn new(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { users, posts }
    }

    /// Own posts, then each following's posts in followings order. Followings
    /// without a user record contribute nothing. No de-duplication or global sort.
    pub async fn get_timeline(&self, who: &Identifier) -> Result<Vec<Post>, ApiError> {
        let user = IdentityService::new(self.users.clone()).resolve(who).await?;

        let own = self.posts.find_by_owner(&user.id).await?;

        let lookups = user.followings.iter().map(|friend_id| self.posts_of_existing(friend_id));
        let per_friend = try_join_all(lookups).await?;

        debug!(
            user_id = %user.id,
            own_posts = own.len(),
            followings = user.followings.len(),
            "Timeline assembled"
        );

        Ok(own.into_iter().chain(per_friend.into_iter().flatten()).collect())
    }

    /// Posts of the user with the given username
    pub async fn get_profile_feed(&self, username: &str) -> Result<Vec<Post>, ApiError> {
        let user = IdentityService::new(self.users.clone())
            .find_by_username(username)
            .await?;
        self.posts.find_by_owner(&user.id).await
    }

    async fn posts_of_existing(&self, user_id: &str) -> Result<Vec<Post>, ApiError> {
        let exists = self
            .users
            .find(&Identifier::Internal(user_id.to_string()))
            .await?
            .is_some();

        if exists {
            self.posts.find_by_owner(user_id).await
        } else {
            Ok(Vec::new())
        }
    }
}
