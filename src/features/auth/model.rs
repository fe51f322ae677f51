use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::ROLE_ADMIN;

/// Caller identity resolved from a validated access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Stable subject identifier; becomes an issue's `reporter_id`
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// The admin capability, if this caller holds the admin role
    pub fn admin_capability(&self) -> Option<AdminCapability> {
        self.is_admin().then(|| AdminCapability {
            sub: self.sub.clone(),
        })
    }
}

/// Proof that the caller is an admin.
///
/// Only obtainable through [`AuthenticatedUser::admin_capability`], so admin-only
/// service operations that take one cannot be reached by other callers.
#[derive(Debug, Clone)]
pub struct AdminCapability {
    sub: String,
}

impl AdminCapability {
    /// Subject of the admin acting with this capability
    pub fn sub(&self) -> &str {
        &self.sub
    }
}
