// Common module - shared types and utilities across all modules

pub mod config;
pub mod dev_mode;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod state;
pub mod transaction;
pub mod validation;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used types for convenience
pub use error::ApiError;
pub use helpers::{
    email_local_part, file_extension, now_timestamp, safe_email_log, sanitize_filename,
};
pub use id_generator::{generate_post_id, generate_raw_id, generate_user_id};
pub use state::AppState;
pub use validation::{ValidationResult, Validator};
