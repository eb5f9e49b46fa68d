// src/common/dev_mode.rs
//! Development mode configuration and utilities
//! Allows bypassing token verification for local testing

use std::env;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    /// Identity-provider id every request is attributed to
    pub external_id: String,
    pub user_is_admin: bool,
}

impl Default for DevModeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            external_id: "user_dev".to_string(),
            user_is_admin: false,
        }
    }
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        let external_id =
            env::var("DEV_USER_EXTERNAL_ID").unwrap_or_else(|_| "user_dev".to_string());

        let user_is_admin = env::var("DEV_USER_IS_ADMIN")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        Self {
            enabled,
            external_id,
            user_is_admin,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Log dev mode status on startup
pub fn log_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        warn!(
            external_id = %config.external_id,
            admin = config.user_is_admin,
            "DEV MODE ENABLED: token verification bypassed, DO NOT USE IN PRODUCTION"
        );
    } else {
        info!("Production mode - authentication required");
    }
}

/// CLI argument parsing for dev mode
pub fn parse_dev_mode_args<I>(args: I) -> Option<bool>
where
    I: IntoIterator<Item = String>,
{
    let mut decision = None;
    for arg in args {
        match arg.as_str() {
            "--dev" | "--dev-mode" => decision = Some(true),
            "--no-dev" | "--prod" | "--production" => decision = Some(false),
            _ => {}
        }
    }
    decision
}

/// Override dev mode from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args(env::args().skip(1)) {
        info!(dev_mode = cli_dev_mode, "CLI override for DEV_MODE");
        config.enabled = cli_dev_mode;
    }

    config
}
