//! Hierarchical module access.
//!
//! Module identifiers mirror the console's route tree (`finance.expenses`
//! lives at `/finance/expenses`). The hierarchy is only in the naming: a grant
//! on `finance` says nothing about `finance.expenses`, and the reverse.

use serde::{Deserialize, Serialize};

use crate::roles::is_admin;
use crate::{PermissionRegistry, UserProfile};

/// Every protectable section of the console UI.
pub const KNOWN_MODULES: &[&str] = &[
    "dashboard",
    "users",
    "settings",
    "finance",
    "finance.expenses",
    "finance.income",
    "finance.reports",
    "finance.budgets",
    "beetrader",
    "beetrader.tracker",
    "beetrader.analytics",
    "tasks",
    "tasks.monitor",
    "tasks.scheduler",
];

/// Dot-separated module identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Derive a module from a route path: segments joined by `.`.
    ///
    /// `/beetrader/tracker` gives `beetrader.tracker`. The root path (and any
    /// path without segments) names no module. Query and fragment are ignored.
    pub fn infer_from_path(path: &str) -> Option<ModuleId> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let joined = path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(".");
        if joined.is_empty() {
            None
        } else {
            Some(ModuleId(joined))
        }
    }
}

impl core::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Which rule granted a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantSource {
    AdminRole,
    AllowList,
    Registry,
}

/// First rule that grants `module`, in decision order: admin role, the
/// profile's allow-list, then a registry entry for the same key that the
/// roles satisfy. `None` means denied.
///
/// Unlike [`PermissionRegistry::has_permission`], an unregistered key is not
/// granted here.
pub fn module_grant(
    registry: &PermissionRegistry,
    user: &UserProfile,
    module: &str,
) -> Option<GrantSource> {
    if is_admin(&user.roles) {
        return Some(GrantSource::AdminRole);
    }
    if user.allowed_modules.iter().any(|m| m == module) {
        return Some(GrantSource::AllowList);
    }
    if registry.contains(module) && registry.has_permission(&user.roles, module) {
        return Some(GrantSource::Registry);
    }
    None
}

pub fn has_module_access(registry: &PermissionRegistry, user: &UserProfile, module: &str) -> bool {
    module_grant(registry, user, module).is_some()
}

/// Registry pages the roles satisfy, then the allow-list, without duplicates.
pub fn accessible_modules(registry: &PermissionRegistry, user: &UserProfile) -> Vec<String> {
    let mut modules = registry.accessible_pages(&user.roles);
    for module in &user.allowed_modules {
        if !modules.contains(module) {
            modules.push(module.clone());
        }
    }
    modules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use proptest::prelude::*;
    use warden_core::UserId;

    fn user(roles: &[Role], allowed: &[&str]) -> UserProfile {
        UserProfile::new(UserId::new())
            .with_roles(roles.iter().copied())
            .with_allowed_modules(allowed.iter().map(|m| m.to_string()))
    }

    #[test]
    fn infers_module_from_path() {
        assert_eq!(
            ModuleId::infer_from_path("/beetrader/tracker"),
            Some(ModuleId::new("beetrader.tracker"))
        );
        assert_eq!(ModuleId::infer_from_path("/finance/"), Some(ModuleId::new("finance")));
        assert_eq!(
            ModuleId::infer_from_path("/finance/expenses?page=2"),
            Some(ModuleId::new("finance.expenses"))
        );
        assert_eq!(ModuleId::infer_from_path("/"), None);
        assert_eq!(ModuleId::infer_from_path(""), None);
    }

    #[test]
    fn segments_split_on_dots() {
        let id = ModuleId::new("finance.expenses");
        assert_eq!(id.segments().collect::<Vec<_>>(), vec!["finance", "expenses"]);
    }

    #[test]
    fn admin_is_granted_everything() {
        let registry = PermissionRegistry::builtin();
        let admin = user(&[Role::Admin], &[]);
        assert_eq!(
            module_grant(&registry, &admin, "tasks.scheduler"),
            Some(GrantSource::AdminRole)
        );
        assert!(has_module_access(&registry, &admin, "no.such.module"));
    }

    #[test]
    fn allow_list_grants_without_registry_entry() {
        let registry = PermissionRegistry::builtin();
        let member = user(&[Role::User], &["finance.budgets"]);
        assert_eq!(
            module_grant(&registry, &member, "finance.budgets"),
            Some(GrantSource::AllowList)
        );
        // Allow-list works even with no roles at all.
        let bare = user(&[], &["beetrader.analytics"]);
        assert!(has_module_access(&registry, &bare, "beetrader.analytics"));
    }

    #[test]
    fn registry_grants_when_roles_match() {
        let registry = PermissionRegistry::builtin();
        let manager = user(&[Role::Manager], &[]);
        assert_eq!(
            module_grant(&registry, &manager, "beetrader.tracker"),
            Some(GrantSource::Registry)
        );
        assert!(!has_module_access(&registry, &manager, "beetrader.analytics"));
    }

    #[test]
    fn unregistered_module_is_denied_without_allow_list() {
        let registry = PermissionRegistry::builtin();
        let manager = user(&[Role::Manager], &[]);
        assert!(!has_module_access(&registry, &manager, "finance.budgets"));
    }

    #[test]
    fn no_prefix_inheritance() {
        let registry = PermissionRegistry::builtin();
        let parent_only = user(&[Role::Guest], &["finance"]);
        assert!(has_module_access(&registry, &parent_only, "finance"));
        assert!(!has_module_access(&registry, &parent_only, "finance.expenses"));

        let child_only = user(&[Role::Guest], &["beetrader.tracker"]);
        assert!(!has_module_access(&registry, &child_only, "beetrader"));
    }

    #[test]
    fn accessible_modules_unions_without_duplicates() {
        let registry = PermissionRegistry::builtin();
        let guest = user(&[Role::Guest], &["finance.budgets", "dashboard", "finance.budgets"]);
        assert_eq!(
            accessible_modules(&registry, &guest),
            vec!["dashboard".to_string(), "finance.budgets".to_string()]
        );

        let nobody = user(&[], &[]);
        assert!(accessible_modules(&registry, &nobody).is_empty());
    }

    proptest! {
        #[test]
        fn admin_granted_regardless_of_other_inputs(
            module in "[a-z]{1,10}(\\.[a-z]{1,10}){0,2}",
            allowed in prop::collection::vec("[a-z]{1,6}", 0..3),
        ) {
            let registry = PermissionRegistry::builtin();
            let mut admin = user(&[Role::Admin], &[]);
            admin.allowed_modules = allowed;
            prop_assert!(has_module_access(&registry, &admin, &module));
        }

        #[test]
        fn allow_listed_module_always_granted(module in "[a-z]{1,10}(\\.[a-z]{1,10}){0,2}") {
            let registry = PermissionRegistry::builtin();
            let guest = user(&[Role::Guest], &[module.as_str()]);
            prop_assert!(has_module_access(&registry, &guest, &module));
        }
    }
}
