//! Extractors that turn the authenticated caller into capabilities.
//!
//! The auth middleware stores an [`AuthenticatedUser`] in request extensions;
//! handlers either take that user directly (any signed-in caller) or
//! [`RequireAdmin`] for operations reserved to admins.

use crate::core::error::AppError;
use crate::features::auth::model::{AdminCapability, AuthenticatedUser};
use axum::{extract::FromRequestParts, http::request::Parts};

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Guard for admin-only operations.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(admin): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AdminCapability);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        user.admin_capability()
            .map(RequireAdmin)
            .ok_or_else(|| AppError::Forbidden("Admin access required".to_string()))
    }
}
