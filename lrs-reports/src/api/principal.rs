//! Principal extraction from forwarded identity headers
//!
//! The authentication gateway verifies credentials and forwards the caller
//! as `x-lrs-user-id` / `x-lrs-user-role`. Requests without both headers are
//! rejected with 401 before reaching any handler logic.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use lrs_common::{Principal, Role};

use super::error::ApiError;
use crate::hierarchy::Supervisor;

pub const USER_ID_HEADER: &str = "x-lrs-user-id";
pub const USER_ROLE_HEADER: &str = "x-lrs-user-role";

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthPrincipal(pub Principal);

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", name)))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized(format!("Unreadable {} header", name)))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, USER_ID_HEADER)?
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ApiError::Unauthorized("Invalid user id".to_string()))?;

        let role = header(parts, USER_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(|_| ApiError::Unauthorized("Invalid user role".to_string()))?;

        Ok(AuthPrincipal(Principal::new(id, role)))
    }
}

impl AuthPrincipal {
    /// Supervisor identity for a PL or PRL querying its own id
    pub fn supervisor(&self, role: Role, id: i64) -> Result<Supervisor, ApiError> {
        self.0.require_self(role, id)?;
        Supervisor::from_principal(&self.0)
            .ok_or_else(|| ApiError::Forbidden(format!("{} is not a supervisory role", role)))
    }
}
