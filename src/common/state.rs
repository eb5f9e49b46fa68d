// Application state shared across all modules

use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::common::config::AppConfig;
use crate::common::dev_mode::DevModeConfig;
use crate::posts::{PostRepository, PostService, SqlitePostRepository, TimelineService};
use crate::users::{IdentityService, RelationshipGraph, SqliteUserRepository, UserRepository};
use crate::webhooks::WebhookVerifier;

/// Repositories, verifiers and configuration injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub token_verifier: Arc<TokenVerifier>,
    /// `None` when no webhook secret is configured
    pub webhook_verifier: Option<Arc<WebhookVerifier>>,
    pub images_dir: PathBuf,
    pub admin_emails: HashSet<String>,
    pub dev_mode: DevModeConfig,
}

impl AppState {
    /// SQLite-backed state for the given pool and configuration
    pub fn from_pool(
        db: SqlitePool,
        config: &AppConfig,
        dev_mode: DevModeConfig,
    ) -> anyhow::Result<Self> {
        let token_verifier = TokenVerifier::from_config(config, dev_mode.is_enabled())?;
        let webhook_verifier = config
            .clerk_webhook_secret
            .as_deref()
            .map(WebhookVerifier::new)
            .transpose()?
            .map(Arc::new);

        Ok(Self {
            users: Arc::new(SqliteUserRepository::new(db.clone())),
            posts: Arc::new(SqlitePostRepository::new(db)),
            token_verifier: Arc::new(token_verifier),
            webhook_verifier,
            images_dir: config.images_dir.clone(),
            admin_emails: config.admin_emails.clone(),
            dev_mode,
        })
    }

    pub fn identity(&self) -> IdentityService {
        IdentityService::new(self.users.clone())
    }

    pub fn graph(&self) -> RelationshipGraph {
        RelationshipGraph::new(self.users.clone())
    }

    pub fn post_store(&self) -> PostService {
        PostService::new(self.posts.clone())
    }

    pub fn timeline(&self) -> TimelineService {
        TimelineService::new(self.users.clone(), self.posts.clone())
    }
}
