use super::models::ProfileUpdate;
use crate::common::{ValidationResult, Validator};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 20;
pub const EMAIL_MAX: usize = 50;

/// Validates profile edits submitted through the API
pub struct ProfileUpdateValidator;

impl Validator<ProfileUpdate> for ProfileUpdateValidator {
    fn validate(&self, data: &ProfileUpdate) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.is_empty() {
            result.add_error("body", "At least one of username, email, profilePicture is required");
        }

        if let Some(username) = &data.username {
            let len = username.chars().count();
            if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
                result.add_error("username", "Username must be between 3 and 20 characters");
            }
            if username.chars().any(char::is_whitespace) {
                result.add_error("username", "Username must not contain whitespace");
            }
        }

        if let Some(email) = &data.email {
            if !email.contains('@') || email.starts_with('@') {
                result.add_error("email", "Email must be a valid address");
            }
            if email.len() > EMAIL_MAX {
                result.add_error("email", "Email must not exceed 50 characters");
            }
        }

        result
    }
}
