use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse-grained principal classification.
///
/// There is no implied hierarchy: `Admin` only outranks other roles where a
/// registry entry lists it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    User,
    Guest,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::User, Role::Guest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
            Role::Guest => "guest",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Direct membership test. False for an empty role list.
pub fn has_role(roles: &[Role], role: Role) -> bool {
    roles.contains(&role)
}

/// True iff any of `wanted` is held. False when either side is empty.
pub fn has_any_role(roles: &[Role], wanted: &[Role]) -> bool {
    wanted.iter().any(|w| roles.contains(w))
}

pub fn is_admin(roles: &[Role]) -> bool {
    has_any_role(roles, &[Role::Admin])
}

pub fn is_admin_or_manager(roles: &[Role]) -> bool {
    has_any_role(roles, &[Role::Admin, Role::Manager])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lowercase_names() {
        assert_eq!("manager".parse::<Role>().unwrap(), Role::Manager);
        assert!("Manager".parse::<Role>().is_err());
        assert_eq!(
            serde_json::from_str::<Vec<Role>>(r#"["admin","guest"]"#).unwrap(),
            vec![Role::Admin, Role::Guest]
        );
    }

    #[test]
    fn membership_on_empty_input_is_false() {
        assert!(!has_role(&[], Role::Admin));
        assert!(!has_any_role(&[], &[Role::Admin, Role::User]));
        assert!(!has_any_role(&[Role::Admin], &[]));
        assert!(!is_admin(&[]));
    }

    #[test]
    fn convenience_compositions() {
        assert!(is_admin(&[Role::Guest, Role::Admin]));
        assert!(!is_admin(&[Role::Manager]));
        assert!(is_admin_or_manager(&[Role::Manager]));
        assert!(!is_admin_or_manager(&[Role::User, Role::Guest]));
    }
}
