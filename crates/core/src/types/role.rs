//! Account roles and the capabilities they grant.

use serde::{Deserialize, Serialize};

/// Account role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including account management.
    Admin,
    /// Catalog management only.
    Editor,
}

/// A capability required by an operation.
///
/// Handlers check capabilities rather than comparing role strings, so the
/// role-to-permission mapping lives in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create, update, and delete products and categories; upload images.
    ManageCatalog,
    /// Register accounts and manage users.
    ManageUsers,
}

impl Role {
    /// Whether this role grants the given capability.
    #[must_use]
    pub const fn allows(&self, capability: Capability) -> bool {
        match (self, capability) {
            (Self::Admin, _) | (Self::Editor, Capability::ManageCatalog) => true,
            (Self::Editor, Capability::ManageUsers) => false,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Editor => write!(f, "editor"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_allows_everything() {
        assert!(Role::Admin.allows(Capability::ManageCatalog));
        assert!(Role::Admin.allows(Capability::ManageUsers));
    }

    #[test]
    fn test_editor_is_catalog_only() {
        assert!(Role::Editor.allows(Capability::ManageCatalog));
        assert!(!Role::Editor.allows(Capability::ManageUsers));
    }

    #[test]
    fn test_round_trip_str() {
        assert_eq!("admin".parse::<Role>().ok(), Some(Role::Admin));
        assert_eq!("editor".parse::<Role>().ok(), Some(Role::Editor));
        assert!("viewer".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Editor).unwrap(), "\"editor\"");
    }
}
