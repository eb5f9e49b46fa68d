//! Tests for auth module
//!
//! Covers session token verification, token extraction from headers,
//! caller resolution and the owner-or-override rule.

#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::http::{header, HeaderMap, HeaderValue};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    use crate::common::test_support::{
        caller_for, memory_state, seed_user, seed_user_with_email, session_token, test_config,
        ADMIN_EMAIL, TEST_JWT_SECRET,
    };
    use crate::common::ApiError;
    use extractors::{extract_token, require_authenticated, resolve_caller_identity};
    use models::{TokenError, PLACEHOLDER_SECRET};

    fn config_with_secret(secret: Option<&str>) -> crate::common::config::AppConfig {
        let mut config = test_config(std::env::temp_dir());
        config.jwt_secret = secret.map(str::to_string);
        config.clerk_jwt_key = None;
        config
    }

    fn token_with(secret: &str, sub: &str, exp: usize) -> String {
        let claims = models::Claims {
            sub: sub.to_string(),
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("Failed to encode token")
    }

    fn headers_with(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_hs256_verifier_accepts_valid_token() {
        let verifier = TokenVerifier::hs256(TEST_JWT_SECRET);
        let claims = verifier
            .verify(&token_with(TEST_JWT_SECRET, "user_abc", 9999999999))
            .expect("token should verify");

        assert_eq!(claims.sub, "user_abc");
    }

    #[test]
    fn test_verifier_rejects_wrong_secret() {
        let verifier = TokenVerifier::hs256(TEST_JWT_SECRET);
        let result = verifier.verify(&token_with("wrong_secret_key", "user_abc", 9999999999));

        assert!(result.is_err(), "Token signed with another secret must fail");
    }

    #[test]
    fn test_verifier_rejects_expired_token() {
        let verifier = TokenVerifier::hs256(TEST_JWT_SECRET);
        let result = verifier.verify(&token_with(TEST_JWT_SECRET, "user_abc", 1_000_000));

        assert!(result.is_err());
    }

    #[test]
    fn test_rs256_rejects_malformed_pem() {
        assert!(matches!(
            TokenVerifier::rs256_pem("not a pem"),
            Err(models::TokenError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_extract_token_from_bearer_header() {
        let headers = headers_with(header::AUTHORIZATION, "Bearer abc.def.ghi");
        assert_eq!(extract_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_token_from_raw_header() {
        let headers = headers_with(header::AUTHORIZATION, "abc.def.ghi");
        assert_eq!(extract_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_token_from_session_cookie() {
        let headers = headers_with(header::COOKIE, "theme=dark; __session=abc.def.ghi");
        assert_eq!(extract_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_token_missing() {
        assert_eq!(extract_token(&HeaderMap::new()), None);

        let headers = headers_with(header::AUTHORIZATION, "Bearer ");
        assert_eq!(extract_token(&headers), None);
    }

    #[tokio::test]
    async fn test_require_authenticated_without_token_is_unauthorized() {
        let state = memory_state().await;
        let result = require_authenticated(&HeaderMap::new(), &state);

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_require_authenticated_with_bad_token_is_unauthorized() {
        let state = memory_state().await;
        let headers = headers_with(header::AUTHORIZATION, "Bearer garbage");

        match require_authenticated(&headers, &state) {
            Err(ApiError::Unauthorized(msg)) => assert_eq!(msg, "invalid token"),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_require_authenticated_returns_subject() {
        let state = memory_state().await;
        let headers = headers_with(
            header::AUTHORIZATION,
            &format!("Bearer {}", session_token("user_abc")),
        );

        let authed = require_authenticated(&headers, &state).expect("should authenticate");
        assert_eq!(authed.external_id, "user_abc");
    }

    #[tokio::test]
    async fn test_dev_mode_bypasses_token() {
        let mut state = memory_state().await;
        state.dev_mode.enabled = true;
        state.dev_mode.external_id = "user_dev".to_string();

        let authed = require_authenticated(&HeaderMap::new(), &state).expect("dev bypass");
        assert_eq!(authed.external_id, "user_dev");
    }

    #[tokio::test]
    async fn test_resolve_caller_maps_to_internal_id() {
        let state = memory_state().await;
        let user = seed_user(&state, "user_abc", "alice").await;

        let caller = resolve_caller_identity(
            &state,
            &AuthedUser {
                external_id: "user_abc".to_string(),
            },
        )
        .await
        .expect("caller");

        assert_eq!(caller.id, user.id);
        assert!(!caller.is_admin);
    }

    #[tokio::test]
    async fn test_resolve_caller_grants_admin_from_stored_email() {
        let state = memory_state().await;
        seed_user_with_email(&state, "user_root", "root", ADMIN_EMAIL).await;

        let caller = resolve_caller_identity(
            &state,
            &AuthedUser {
                external_id: "user_root".to_string(),
            },
        )
        .await
        .expect("caller");

        assert!(caller.is_admin);
    }

    #[tokio::test]
    async fn test_resolve_caller_without_record_is_not_found() {
        let state = memory_state().await;
        let result = resolve_caller_identity(
            &state,
            &AuthedUser {
                external_id: "user_ghost".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_gate_allows_owner_and_admin() {
        let state = memory_state().await;
        let owner = seed_user(&state, "user_a", "alice").await;
        let other = seed_user(&state, "user_b", "bob").await;

        assert!(require_owner_or_override(&owner.id, &caller_for(&owner, false), "denied").is_ok());
        assert!(require_owner_or_override(&owner.id, &caller_for(&other, true), "denied").is_ok());
    }

    #[tokio::test]
    async fn test_gate_denies_other_users() {
        let state = memory_state().await;
        let owner = seed_user(&state, "user_a", "alice").await;
        let other = seed_user(&state, "user_b", "bob").await;

        match require_owner_or_override(&owner.id, &caller_for(&other, false), "denied") {
            Err(ApiError::Forbidden(msg)) => assert_eq!(msg, "denied"),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_verifier_requires_a_key_outside_dev_mode() {
        let result = TokenVerifier::from_config(&config_with_secret(None), false);
        assert!(matches!(result, Err(TokenError::NotConfigured)));
    }

    #[test]
    fn test_verifier_rejects_placeholder_secret() {
        let result = TokenVerifier::from_config(&config_with_secret(Some(PLACEHOLDER_SECRET)), false);
        assert!(matches!(result, Err(TokenError::NotConfigured)));
    }

    #[test]
    fn test_placeholder_secret_cannot_sign_tokens_in_dev_mode() {
        let verifier =
            TokenVerifier::from_config(&config_with_secret(Some(PLACEHOLDER_SECRET)), true)
                .expect("dev mode verifier");

        let forged = token_with(PLACEHOLDER_SECRET, "user_a", 9_999_999_999);
        assert!(verifier.verify(&forged).is_err());
    }

    #[test]
    fn test_verifier_uses_configured_secret() {
        let verifier = TokenVerifier::from_config(&config_with_secret(Some(TEST_JWT_SECRET)), false)
            .expect("verifier");

        let claims = verifier.verify(&session_token("user_a")).expect("valid token");
        assert_eq!(claims.sub, "user_a");
    }
}
