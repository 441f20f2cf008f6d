use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use warden_core::UserId;

use crate::Role;

/// The authenticated principal as seen by the access policy.
///
/// Owned by the session store; policy code only reads it. Every list and flag
/// defaults when absent so partial profiles from the identity backend still
/// deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub display_name: String,

    /// Order is irrelevant; may be empty.
    #[serde(default)]
    pub roles: Vec<Role>,

    #[serde(default)]
    pub custom_permissions: Vec<String>,

    /// Modules granted to this user regardless of role.
    #[serde(default)]
    pub allowed_modules: Vec<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub is_verified: bool,

    /// Opaque to the access policy.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

impl UserProfile {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            email: String::new(),
            display_name: String::new(),
            roles: Vec::new(),
            custom_permissions: Vec::new(),
            allowed_modules: Vec::new(),
            is_active: true,
            is_verified: false,
            metadata: Map::new(),
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    pub fn with_allowed_modules(mut self, modules: impl IntoIterator<Item = String>) -> Self {
        self.allowed_modules = modules.into_iter().collect();
        self
    }

    pub fn with_custom_permissions(
        mut self,
        permissions: impl IntoIterator<Item = String>,
    ) -> Self {
        self.custom_permissions = permissions.into_iter().collect();
        self
    }

    pub fn has_custom_permission(&self, key: &str) -> bool {
        self.custom_permissions.iter().any(|p| p == key)
    }
}

/// Roles of an optional profile; empty when signed out.
pub fn roles_of(user: Option<&UserProfile>) -> &[Role] {
    user.map(|u| u.roles.as_slice()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::has_permission;

    #[test]
    fn partial_profile_deserializes_with_defaults() {
        let id = UserId::new();
        let json = format!(r#"{{"id":"{id}","roles":["manager"],"metadata":{{"theme":"dark"}}}}"#);
        let profile: UserProfile = serde_json::from_str(&json).unwrap();

        assert_eq!(profile.id, id);
        assert_eq!(profile.roles, vec![Role::Manager]);
        assert!(profile.allowed_modules.is_empty());
        assert!(profile.is_active);
        assert!(!profile.is_verified);
        assert_eq!(profile.metadata["theme"], "dark");
    }

    #[test]
    fn absent_profile_has_no_roles() {
        assert!(roles_of(None).is_empty());
        assert!(!has_permission(roles_of(None), "dashboard"));
        assert!(!has_permission(roles_of(None), "not.registered"));

        let profile = UserProfile::new(UserId::new()).with_roles([Role::Guest]);
        assert_eq!(roles_of(Some(&profile)), &[Role::Guest]);
    }

    #[test]
    fn custom_permissions_are_plain_membership() {
        let profile = UserProfile::new(UserId::new())
            .with_custom_permissions(["reports.export".to_string()]);
        assert!(profile.has_custom_permission("reports.export"));
        assert!(!profile.has_custom_permission("reports"));
    }
}
