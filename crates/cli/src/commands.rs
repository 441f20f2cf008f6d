use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::{Value, json};

use warden_auth::{
    PermissionRegistry, RegistryOverview, UserProfile, accessible_modules, explain_module_access,
};
use warden_guard::{GuardConfig, Location, RouteGuard};
use warden_session::{SharedSessionStore, StaticIdentityProvider};

use crate::{Cli, Commands};

pub async fn run(cli: &Cli) -> Result<Value> {
    let config = match cli.config.as_deref() {
        Some(path) => load_config(path)?,
        None => GuardConfig::from_env(),
    };
    let profile = cli.profile.as_deref().map(load_profile).transpose()?;
    let registry = PermissionRegistry::builtin();
    tracing::debug!(command = ?cli.command, signed_in = profile.is_some(), "running diagnostic");

    match &cli.command {
        Commands::Check { href } => Ok(check(profile, config, href).await),
        Commands::Modules => {
            let profile = require(profile)?;
            Ok(json!({ "modules": accessible_modules(&registry, &profile) }))
        }
        Commands::Explain { module } => {
            let profile = require(profile)?;
            Ok(serde_json::to_value(explain_module_access(&registry, &profile, module))?)
        }
        Commands::Registry => Ok(serde_json::to_value(RegistryOverview::from_registry(&registry))?),
    }
}

async fn check(profile: Option<UserProfile>, config: GuardConfig, href: &str) -> Value {
    let provider = match profile {
        Some(profile) => StaticIdentityProvider::signed_in(profile),
        None => StaticIdentityProvider::signed_out(),
    };
    let guard = RouteGuard::new(SharedSessionStore::new(provider), config);
    let outcome = guard.before_enter(&Location::parse(href)).await;

    json!({
        "href": href,
        "state": outcome.state,
        "redirect": outcome.redirect.map(|r| r.href()),
    })
}

fn require(profile: Option<UserProfile>) -> Result<UserProfile> {
    profile.ok_or_else(|| anyhow!("this command needs --profile"))
}

fn load_profile(path: &Path) -> Result<UserProfile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading profile {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing profile {}", path.display()))
}

fn load_config(path: &Path) -> Result<GuardConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: GuardConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use warden_auth::Role;
    use warden_core::UserId;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("warden-{}-{}", UserId::new(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn check_reports_state_and_redirect() {
        let manager = UserProfile::new(UserId::new()).with_roles([Role::Manager]);

        let out = check(Some(manager.clone()), GuardConfig::default(), "/settings").await;
        assert_eq!(out["state"], "authorized");
        assert!(out["redirect"].is_null());

        let out = check(Some(manager), GuardConfig::default(), "/users").await;
        assert_eq!(out["state"], "forbidden");
        assert_eq!(out["redirect"], "/error/403");

        let out = check(None, GuardConfig::default(), "/tasks?mine=1").await;
        assert_eq!(out["state"], "unauthenticated");
        assert_eq!(out["redirect"], "/auth/login?redirect=%2Ftasks%3Fmine%3D1");
    }

    #[tokio::test]
    async fn run_reads_profile_from_disk() {
        let id = UserId::new();
        let path = write_temp(
            "profile.json",
            &format!(r#"{{"id":"{id}","roles":["guest"],"allowed_modules":["finance.budgets"]}}"#),
        );
        let cli = Cli {
            profile: Some(path.clone()),
            config: None,
            command: Commands::Modules,
        };

        let out = run(&cli).await.unwrap();
        assert_eq!(out["modules"], json!(["dashboard", "finance.budgets"]));
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn modules_without_profile_is_an_error() {
        let cli = Cli {
            profile: None,
            config: None,
            command: Commands::Modules,
        };
        let err = run(&cli).await.unwrap_err();
        assert!(err.to_string().contains("--profile"));
    }

    #[tokio::test]
    async fn invalid_config_file_is_rejected() {
        let path = write_temp("config.json", r#"{"forbidden_path":"denied"}"#);
        let cli = Cli {
            profile: None,
            config: Some(path.clone()),
            command: Commands::Registry,
        };
        assert!(run(&cli).await.is_err());
        std::fs::remove_file(path).unwrap();
    }
}
