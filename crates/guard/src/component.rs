//! Component-level guards for partial UI.
//!
//! These never navigate on their own except [`RoleGuard`] with a redirect
//! configured. They evaluate a [`SessionSnapshot`] and say what to render;
//! the view layer decides how.

use std::sync::Arc;

use serde::Serialize;

use warden_auth::{ModuleId, PermissionRegistry, Role, has_module_access, roles_of};
use warden_session::SessionSnapshot;

use crate::{Navigator, Redirect};

/// What a guard decided to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<V> {
    /// Access granted; the wrapped subtree.
    Children(V),
    /// Access denied; the caller-supplied fallback.
    Fallback(V),
    /// Access denied; the default notice.
    Notice(AccessNotice),
    /// The session is still initializing.
    Pending,
    /// Render nothing.
    Nothing,
}

impl<V> Rendered<V> {
    pub fn is_children(&self) -> bool {
        matches!(self, Rendered::Children(_))
    }

    pub fn into_children(self) -> Option<V> {
        match self {
            Rendered::Children(v) => Some(v),
            _ => None,
        }
    }
}

/// Default "insufficient permission" notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessNotice {
    pub module: String,
    pub message: String,
}

impl AccessNotice {
    pub fn insufficient_permission(module: &ModuleId) -> Self {
        Self {
            module: module.to_string(),
            message: format!("You do not have permission to access '{}'.", module),
        }
    }

    pub fn go_back<N: Navigator + ?Sized>(&self, navigator: &N) {
        navigator.back();
    }
}

/// Still waiting on the first session load.
fn pending(snapshot: &SessionSnapshot) -> bool {
    snapshot.loading && snapshot.user.is_none()
}

// ─────────────────────────────────────────────────────────────────────────────
// Module Guard
// ─────────────────────────────────────────────────────────────────────────────

/// Renders its children iff the signed-in user may open `module`.
pub struct ModuleGuard<'a> {
    registry: &'a PermissionRegistry,
    module: ModuleId,
}

impl<'a> ModuleGuard<'a> {
    pub fn new(registry: &'a PermissionRegistry, module: impl Into<ModuleId>) -> Self {
        Self {
            registry,
            module: module.into(),
        }
    }

    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    pub fn allows(&self, snapshot: &SessionSnapshot) -> bool {
        snapshot
            .user()
            .is_some_and(|user| has_module_access(self.registry, user, self.module.as_str()))
    }

    /// Children, or the default notice on denial.
    pub fn render<V>(
        &self,
        snapshot: &SessionSnapshot,
        children: impl FnOnce() -> V,
    ) -> Rendered<V> {
        if pending(snapshot) {
            return Rendered::Pending;
        }
        if self.allows(snapshot) {
            Rendered::Children(children())
        } else {
            Rendered::Notice(AccessNotice::insufficient_permission(&self.module))
        }
    }

    pub fn render_or<V>(
        &self,
        snapshot: &SessionSnapshot,
        children: impl FnOnce() -> V,
        fallback: impl FnOnce() -> V,
    ) -> Rendered<V> {
        match self.render(snapshot, children) {
            Rendered::Notice(_) => Rendered::Fallback(fallback()),
            other => other,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Page Guard
// ─────────────────────────────────────────────────────────────────────────────

/// Module guard whose module defaults to the one inferred from the path.
pub struct PageGuard<'a> {
    registry: &'a PermissionRegistry,
    module: Option<ModuleId>,
}

impl<'a> PageGuard<'a> {
    pub fn new(registry: &'a PermissionRegistry) -> Self {
        Self {
            registry,
            module: None,
        }
    }

    /// Guard an explicit module instead of inferring it.
    pub fn with_module(mut self, module: impl Into<ModuleId>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// The module this page resolves to at `path`; `None` for the root.
    pub fn resolve(&self, path: &str) -> Option<ModuleId> {
        self.module
            .clone()
            .or_else(|| ModuleId::infer_from_path(path))
    }

    pub fn render<V>(
        &self,
        snapshot: &SessionSnapshot,
        path: &str,
        children: impl FnOnce() -> V,
    ) -> Rendered<V> {
        match self.resolve(path) {
            None => Rendered::Children(children()),
            Some(module) => ModuleGuard::new(self.registry, module).render(snapshot, children),
        }
    }
}

/// Pre-bind `component` to `module` for use at the routing layer.
///
/// The returned closure renders the component through a page guard for that
/// module, whatever path it is mounted at.
pub fn with_page_guard<V, F>(
    registry: Arc<PermissionRegistry>,
    module: impl Into<ModuleId>,
    component: F,
) -> impl Fn(&SessionSnapshot) -> Rendered<V>
where
    F: Fn() -> V,
{
    let module = module.into();
    move |snapshot: &SessionSnapshot| {
        PageGuard::new(&registry)
            .with_module(module.clone())
            .render(snapshot, "", &component)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Role Guard
// ─────────────────────────────────────────────────────────────────────────────

/// Gate on a permission, a role, or any of several roles.
///
/// Precedence: `permission`, then `role`, then `roles`. With none set the
/// guard grants unconditionally.
pub struct RoleGuard<'a> {
    registry: &'a PermissionRegistry,
    permission: Option<String>,
    role: Option<Role>,
    roles: Vec<Role>,
    redirect_to: Option<String>,
}

impl<'a> RoleGuard<'a> {
    pub fn new(registry: &'a PermissionRegistry) -> Self {
        Self {
            registry,
            permission: None,
            role: None,
            roles: Vec::new(),
            redirect_to: None,
        }
    }

    pub fn permission(mut self, key: impl Into<String>) -> Self {
        self.permission = Some(key.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    /// On denial, redirect to `forbidden_path` instead of rendering a fallback.
    pub fn redirect_on_deny(mut self, forbidden_path: impl Into<String>) -> Self {
        self.redirect_to = Some(forbidden_path.into());
        self
    }

    pub fn allows(&self, roles: &[Role]) -> bool {
        if let Some(key) = &self.permission {
            return self.registry.has_permission(roles, key);
        }
        if let Some(role) = self.role {
            return warden_auth::roles::has_role(roles, role);
        }
        if !self.roles.is_empty() {
            return warden_auth::roles::has_any_role(roles, &self.roles);
        }
        true
    }

    /// Children, or nothing on denial.
    pub fn render<V, N>(
        &self,
        snapshot: &SessionSnapshot,
        navigator: &N,
        children: impl FnOnce() -> V,
    ) -> Rendered<V>
    where
        N: Navigator + ?Sized,
    {
        self.decide(snapshot, navigator, children, None::<fn() -> V>)
    }

    pub fn render_or<V, N>(
        &self,
        snapshot: &SessionSnapshot,
        navigator: &N,
        children: impl FnOnce() -> V,
        fallback: impl FnOnce() -> V,
    ) -> Rendered<V>
    where
        N: Navigator + ?Sized,
    {
        self.decide(snapshot, navigator, children, Some(fallback))
    }

    fn decide<V, N, F>(
        &self,
        snapshot: &SessionSnapshot,
        navigator: &N,
        children: impl FnOnce() -> V,
        fallback: Option<F>,
    ) -> Rendered<V>
    where
        N: Navigator + ?Sized,
        F: FnOnce() -> V,
    {
        if self.allows(roles_of(snapshot.user())) {
            return Rendered::Children(children());
        }
        if pending(snapshot) {
            return Rendered::Pending;
        }
        if let Some(path) = &self.redirect_to {
            tracing::debug!(to = %path, "role guard denied; redirecting");
            navigator.redirect(&Redirect::to(path.clone()));
            return Rendered::Nothing;
        }
        match fallback {
            Some(fallback) => Rendered::Fallback(fallback()),
            None => Rendered::Nothing,
        }
    }
}
