//! Owner-or-override authorization rule for mutations on users and posts

use tracing::warn;

use super::extractors::Caller;
use crate::common::ApiError;

/// Allowed when the caller owns the resource or holds the administrator role.
/// The role comes from the identity store, never from the request.
pub fn require_owner_or_override(
    resource_owner_id: &str,
    caller: &Caller,
    denial: &str,
) -> Result<(), ApiError> {
    if caller.id == resource_owner_id || caller.is_admin {
        return Ok(());
    }

    warn!(
        caller_id = %caller.id,
        owner_id = %resource_owner_id,
        "Mutation denied: caller is neither owner nor administrator"
    );
    Err(ApiError::Forbidden(denial.to_string()))
}
