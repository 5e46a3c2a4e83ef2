//! Principal model: the identity fact consumed by the order side.
//!
//! Authentication is owned by a separate service; by the time a request
//! reaches the saga it has been reduced to an opaque user ID plus a role.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Role assigned to a principal by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Regular customer; may act only on resources they own.
    Customer,
    /// Administrative actor; unrestricted loads and forward progression.
    Admin,
}

impl Role {
    /// Parses a role from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Role::Customer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A pre-validated caller identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The caller's user ID.
    pub user_id: UserId,
    /// The caller's role.
    pub role: Role,
}

impl Principal {
    /// Creates a customer principal.
    pub fn customer(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Customer,
        }
    }

    /// Creates an administrative principal.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    /// Returns true if the principal carries the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns true if the principal owns the given resource owner ID.
    pub fn owns(&self, owner_id: UserId) -> bool {
        self.user_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_roundtrip() {
        assert_eq!(Role::parse("customer"), Some(Role::Customer));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn customer_owns_only_their_resources() {
        let user = UserId::new();
        let principal = Principal::customer(user);
        assert!(principal.owns(user));
        assert!(!principal.owns(UserId::new()));
        assert!(!principal.is_admin());
    }

    #[test]
    fn admin_is_admin() {
        let principal = Principal::admin(UserId::new());
        assert!(principal.is_admin());
    }
}
