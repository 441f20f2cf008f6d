use std::collections::BTreeMap;

use serde::Serialize;

use crate::modules::{GrantSource, module_grant};
use crate::{PermissionRegistry, Role, UserProfile};

// ─────────────────────────────────────────────────────────────────────────────
// Module Access Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of a module access decision.
///
/// Always agrees with [`crate::has_module_access`] for the same inputs; it
/// only adds the reason.
#[derive(Debug, Clone, Serialize)]
pub struct AccessExplanation {
    pub module: String,
    pub granted: bool,
    pub reason: String,
    pub roles: Vec<Role>,
    pub grant: Option<GrantSource>,
    pub denial: Option<DenialReason>,
}

/// Detailed reason why module access was denied.
#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// No registry entry and not allow-listed.
    NoRegistryEntry,
    /// Registered, but none of the caller's roles is listed.
    RolesNotListed,
}

/// Explain why `user` may or may not open `module`.
pub fn explain_module_access(
    registry: &PermissionRegistry,
    user: &UserProfile,
    module: &str,
) -> AccessExplanation {
    let roles = user.roles.clone();

    if let Some(source) = module_grant(registry, user, module) {
        let reason = match source {
            GrantSource::AdminRole => "Caller holds the admin role".to_string(),
            GrantSource::AllowList => format!("'{}' is in the caller's allowed modules", module),
            GrantSource::Registry => format!(
                "Registry entry '{}' lists one of the caller's roles {:?}",
                module, user.roles
            ),
        };
        return AccessExplanation {
            module: module.to_string(),
            granted: true,
            reason,
            roles,
            grant: Some(source),
            denial: None,
        };
    }

    let denial = match registry.get(module) {
        None => DenialReason {
            kind: DenialKind::NoRegistryEntry,
            message: format!("'{}' has no registry entry and is not allow-listed", module),
            suggestions: vec![
                format!("Add '{}' to the user's allowed modules", module),
                format!("Register '{}' with the roles that may open it", module),
            ],
        },
        Some(entry) => {
            let listed: Vec<String> = entry.roles.iter().map(|r| r.to_string()).collect();
            DenialReason {
                kind: DenialKind::RolesNotListed,
                message: format!(
                    "'{}' is granted to [{}]; caller holds {:?}",
                    module,
                    listed.join(", "),
                    user.roles
                ),
                suggestions: vec![
                    format!("Assign one of the roles [{}]", listed.join(", ")),
                    format!("Add '{}' to the user's allowed modules", module),
                ],
            }
        }
    };

    AccessExplanation {
        module: module.to_string(),
        granted: false,
        reason: denial.message.clone(),
        roles,
        grant: None,
        denial: Some(denial),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry Overview (Audit Display)
// ─────────────────────────────────────────────────────────────────────────────

/// Permission definition (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct PermissionDefinition {
    pub name: String,
    pub description: String,
    pub category: String,
    pub roles: Vec<Role>,
}

/// Read-only view of the registry, per role and per permission.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryOverview {
    pub roles: BTreeMap<Role, Vec<String>>,
    pub permissions: BTreeMap<String, PermissionDefinition>,
}

impl RegistryOverview {
    pub fn from_registry(registry: &PermissionRegistry) -> Self {
        let roles = Role::ALL
            .into_iter()
            .map(|role| (role, registry.accessible_pages(&[role])))
            .collect();

        let permissions = registry
            .entries()
            .map(|(key, entry)| {
                (
                    key.to_string(),
                    PermissionDefinition {
                        name: key.to_string(),
                        description: entry.description.clone(),
                        category: permission_category(key.as_str()),
                        roles: entry.roles.iter().copied().collect(),
                    },
                )
            })
            .collect();

        Self { roles, permissions }
    }
}

fn permission_category(key: &str) -> String {
    key.split('.').next().unwrap_or(key).to_string()
}
