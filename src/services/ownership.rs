//! Owner-only access to users and entries.

use super::auth_service::AuthenticatedIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Allows the request iff the caller owns the resource.
#[must_use]
pub const fn authorize(identity: &AuthenticatedIdentity, resource_owner_id: i32) -> Decision {
    if identity.user.id == resource_owner_id {
        Decision::Allow
    } else {
        Decision::Deny
    }
}
