// Helper functions for safe logging, timestamps and file names

use chrono::{SecondsFormat, Utc};

/// Masks email addresses for safe logging, keeping the first character of the
/// local part and the domain: `user@example.com` -> `u***@example.com`.
pub fn safe_email_log(email: &str) -> String {
    const MASKED: &str = "***@***.***";

    if email.chars().count() <= 3 {
        return MASKED.to_string();
    }
    let Some((local, domain)) = email.split_once('@') else {
        return MASKED.to_string();
    };
    if domain.contains('@') {
        return MASKED.to_string();
    }

    match local.chars().next() {
        Some(first) => format!("{}***@{}", first, domain),
        None => format!("***@{}", domain),
    }
}

/// Local part of an email address (`a.b@x.com` -> `a.b`).
/// Returns `None` when nothing precedes the `@`.
pub fn email_local_part(email: &str) -> Option<&str> {
    let local = email.split('@').next().unwrap_or("").trim();
    if local.is_empty() {
        None
    } else {
        Some(local)
    }
}

/// Current time as RFC 3339 with millisecond precision.
/// Fixed width, so stored timestamps sort lexicographically.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Strips path components and anything outside `[A-Za-z0-9._-]` from a client-supplied
/// file name. Never returns an empty string.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned = filename
        .replace("..", "")
        .replace('/', "")
        .replace('\\', "")
        .replace('\0', "");

    let sanitized: String = cleaned
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-' || *c == '_')
        .take(255)
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        sanitized
    }
}

/// Extension (with the leading dot) of a file name, lowercased, if it has a short
/// alphanumeric one.
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 8 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}
