//! Access Control
//!
//! `Unauthenticated → Authenticated{identity} → Authorized | Forbidden`

use kernel::id::UserId;

use crate::application::token::{Identity, TokenService};
use crate::domain::value_object::UserRole;
use crate::error::{LmsError, LmsResult};

const BEARER_PREFIX: &str = "Bearer ";

/// Resolve an `Authorization` header value to an identity
pub fn authenticate(tokens: &TokenService, authorization: Option<&str>) -> LmsResult<Identity> {
    let token = authorization
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(LmsError::MissingToken)?;

    tokens.verify(token).ok_or(LmsError::InvalidToken)
}

pub fn require_role(identity: &Identity, role: UserRole) -> LmsResult<()> {
    if identity.role == role {
        return Ok(());
    }
    Err(LmsError::Forbidden(match role {
        UserRole::Admin => "Admin access required",
        UserRole::Student => "Student access required",
    }))
}

/// Student-scoped reads: the student themself, or any admin
pub fn require_self_or_admin(identity: &Identity, student_id: UserId) -> LmsResult<()> {
    if identity.id == student_id || identity.is_admin() {
        return Ok(());
    }
    Err(LmsError::Forbidden("Access denied"))
}
