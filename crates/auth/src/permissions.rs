use std::borrow::{Borrow, Cow};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::Role;
use crate::roles::Role::{Admin, Guest, Manager, User as Member};

/// Permission identifier.
///
/// Either a page name (`"users"`, `"finance.expenses"`) or a `scope.action`
/// compound key (`"users.edit"`). Keys are opaque at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionEntry {
    pub roles: BTreeSet<Role>,
    /// Diagnostic only; never evaluated.
    pub description: String,
}

/// Static table of permission keys and the roles granted each.
///
/// Keys missing from the table are granted to any caller holding at least one
/// role. The table restricts pages; it does not enumerate them.
#[derive(Debug, Clone, Default)]
pub struct PermissionRegistry {
    entries: BTreeMap<Permission, PermissionEntry>,
}

const BUILTIN: &[(&str, &[Role], &str)] = &[
    ("dashboard", &[Admin, Manager, Member, Guest], "Landing dashboard"),
    ("users", &[Admin], "User administration"),
    ("users.create", &[Admin], "Create user accounts"),
    ("users.edit", &[Admin, Manager], "Edit user accounts"),
    ("users.delete", &[Admin], "Delete user accounts"),
    ("settings", &[Admin, Manager], "System settings"),
    ("settings.edit", &[Admin], "Change system settings"),
    ("finance", &[Admin, Manager, Member], "Finance tracking"),
    ("finance.expenses", &[Admin, Manager, Member], "Expense ledger"),
    ("finance.income", &[Admin, Manager, Member], "Income ledger"),
    ("finance.reports", &[Admin, Manager], "Financial reports"),
    ("beetrader", &[Admin, Manager], "Trading dashboards"),
    ("beetrader.tracker", &[Admin, Manager], "Position tracker"),
    ("beetrader.analytics", &[Admin], "Trading analytics"),
    ("tasks", &[Admin, Manager, Member], "Task monitoring"),
    ("tasks.monitor", &[Admin, Manager], "Live task monitor"),
];

static BUILTIN_REGISTRY: LazyLock<Arc<PermissionRegistry>> = LazyLock::new(|| {
    let entries = BUILTIN.iter().map(|(key, roles, description)| {
        (Permission::new(*key), roles.to_vec(), description.to_string())
    });
    Arc::new(PermissionRegistry::from_entries(entries))
});

impl PermissionRegistry {
    /// The console's process-wide table.
    pub fn builtin() -> Arc<PermissionRegistry> {
        Arc::clone(&BUILTIN_REGISTRY)
    }

    pub fn from_entries<I, R>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Permission, R, String)>,
        R: IntoIterator<Item = Role>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, roles, description)| {
                (
                    key,
                    PermissionEntry {
                        roles: roles.into_iter().collect(),
                        description,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&PermissionEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Registered keys in lexical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(Permission::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Permission, &PermissionEntry)> {
        self.entries.iter()
    }

    /// Granted iff the caller holds a role and either the key is unregistered
    /// or its entry lists one of the caller's roles.
    pub fn has_permission(&self, roles: &[Role], key: &str) -> bool {
        if roles.is_empty() {
            return false;
        }
        match self.entries.get(key) {
            None => true,
            Some(entry) => roles.iter().any(|r| entry.roles.contains(r)),
        }
    }

    pub fn has_any_permission(&self, roles: &[Role], keys: &[&str]) -> bool {
        keys.iter().any(|k| self.has_permission(roles, k))
    }

    /// False for an empty role list even when `keys` is empty.
    pub fn has_all_permissions(&self, roles: &[Role], keys: &[&str]) -> bool {
        !roles.is_empty() && keys.iter().all(|k| self.has_permission(roles, k))
    }

    /// Registered keys the roles satisfy. Empty for an empty role list.
    pub fn accessible_pages(&self, roles: &[Role]) -> Vec<String> {
        if roles.is_empty() {
            return Vec::new();
        }
        self.keys()
            .filter(|k| self.has_permission(roles, k))
            .map(str::to_string)
            .collect()
    }
}

/// [`PermissionRegistry::has_permission`] against the builtin table.
pub fn has_permission(roles: &[Role], key: &str) -> bool {
    BUILTIN_REGISTRY.has_permission(roles, key)
}

pub fn has_any_permission(roles: &[Role], keys: &[&str]) -> bool {
    BUILTIN_REGISTRY.has_any_permission(roles, keys)
}

pub fn has_all_permissions(roles: &[Role], keys: &[&str]) -> bool {
    BUILTIN_REGISTRY.has_all_permissions(roles, keys)
}

pub fn accessible_pages(roles: &[Role]) -> Vec<String> {
    BUILTIN_REGISTRY.accessible_pages(roles)
}
