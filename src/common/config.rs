// src/common/config.rs
//! Process configuration read from the environment (after `.env` is loaded).

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8800;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub images_dir: PathBuf,
    /// HS256 secret, used when no provider public key is configured
    pub jwt_secret: Option<String>,
    /// PEM-encoded RS256 public key of the identity provider
    pub clerk_jwt_key: Option<String>,
    pub clerk_webhook_secret: Option<String>,
    pub admin_emails: HashSet<String>,
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://social.db".to_string());

        let images_dir = env::var("IMAGES_DIR").unwrap_or_else(|_| "./public/images".to_string());

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Self {
            port,
            database_url,
            images_dir: PathBuf::from(images_dir),
            jwt_secret: non_empty_var("JWT_SECRET"),
            clerk_jwt_key: non_empty_var("CLERK_JWT_KEY"),
            clerk_webhook_secret: non_empty_var("CLERK_WEBHOOK_SECRET"),
            admin_emails: parse_admin_emails(&env::var("ADMIN_EMAILS").unwrap_or_default()),
            cors_origins: parse_list(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),
            max_upload_bytes,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse admin emails from a comma-separated list, lowercased
pub fn parse_admin_emails(raw: &str) -> HashSet<String> {
    parse_list(raw)
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect()
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_emails() {
        let emails = parse_admin_emails(" Admin@Example.com, ,ops@example.com ");
        assert_eq!(emails.len(), 2);
        assert!(emails.contains("admin@example.com"));
        assert!(emails.contains("ops@example.com"));
    }

    #[test]
    fn test_parse_admin_emails_empty() {
        assert!(parse_admin_emails("").is_empty());
    }

    #[test]
    fn test_parse_list_keeps_order() {
        assert_eq!(
            parse_list("http://a, http://b"),
            vec!["http://a".to_string(), "http://b".to_string()]
        );
    }
}
