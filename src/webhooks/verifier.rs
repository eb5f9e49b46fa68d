//! Signature verification for identity-provider webhooks.
//!
//! ## Scheme
//!
//! - Secret: `whsec_` followed by the base64 HMAC key
//! - Signed content: `{svix-id}.{svix-timestamp}.{raw body}`
//! - `svix-signature`: space-separated `v1,<base64 HMAC-SHA256>` entries; any match passes
//! - `svix-timestamp`: unix seconds, accepted within five minutes of now

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";
const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

pub const HEADER_ID: &str = "svix-id";
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";
pub const HEADER_SIGNATURE: &str = "svix-signature";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    #[error("missing signature headers")]
    MissingHeaders,

    #[error("webhook secret is not valid base64")]
    InvalidSecret,

    #[error("invalid timestamp header")]
    InvalidTimestamp,

    #[error("timestamp outside the allowed tolerance")]
    TimestampOutOfTolerance,

    #[error("no matching signature")]
    InvalidSignature,
}

/// The three signature headers of a delivery
#[derive(Debug, Clone)]
pub struct SignatureHeaders {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

impl SignatureHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, WebhookError> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(WebhookError::MissingHeaders)
        };

        Ok(Self {
            id: get(HEADER_ID)?,
            timestamp: get(HEADER_TIMESTAMP)?,
            signature: get(HEADER_SIGNATURE)?,
        })
    }
}

#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> Result<Self, WebhookError> {
        let encoded = secret.trim();
        let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);
        let key = STANDARD
            .decode(encoded)
            .map_err(|_| WebhookError::InvalidSecret)?;
        Ok(Self { key })
    }

    pub fn verify(&self, headers: &SignatureHeaders, payload: &[u8]) -> Result<(), WebhookError> {
        self.verify_at(headers, payload, Utc::now())
    }

    pub fn verify_at(
        &self,
        headers: &SignatureHeaders,
        payload: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), WebhookError> {
        let sent_at = headers
            .timestamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or(WebhookError::InvalidTimestamp)?;

        if (now - sent_at).abs() > Duration::seconds(TIMESTAMP_TOLERANCE_SECS) {
            return Err(WebhookError::TimestampOutOfTolerance);
        }

        let mac = self.mac_for(&headers.id, &headers.timestamp, payload);

        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .filter_map(|(_, sig)| STANDARD.decode(sig).ok())
            .any(|sig| mac.clone().verify_slice(&sig).is_ok());

        if matched {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }

    /// `v1,<signature>` for the given delivery
    pub fn sign(&self, msg_id: &str, timestamp: &str, payload: &[u8]) -> String {
        let digest = self.mac_for(msg_id, timestamp, payload).finalize().into_bytes();
        format!("{},{}", SIGNATURE_VERSION, STANDARD.encode(digest))
    }

    fn mac_for(&self, msg_id: &str, timestamp: &str, payload: &[u8]) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac
    }
}
