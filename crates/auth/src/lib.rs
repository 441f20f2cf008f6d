//! `warden-auth`: pure access policy for the admin console.
//!
//! Roles, the permission registry, the module access model and the user
//! profile they are evaluated against. No IO, no session state: callers hand
//! in the roles or profile to evaluate.

pub mod authorize;
pub mod modules;
pub mod permissions;
pub mod profile;
pub mod roles;

pub use authorize::{
    AccessExplanation, DenialKind, DenialReason, PermissionDefinition, RegistryOverview,
    explain_module_access,
};
pub use modules::{
    GrantSource, KNOWN_MODULES, ModuleId, accessible_modules, has_module_access, module_grant,
};
pub use permissions::{Permission, PermissionEntry, PermissionRegistry};
pub use profile::{UserProfile, roles_of};
pub use roles::{Role, UnknownRole};
