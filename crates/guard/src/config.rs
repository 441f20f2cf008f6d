//! Guard configuration: where denials go and which sections are protected.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use warden_session::FreshnessPolicy;

/// A protected section of the console: every path under `prefix` requires
/// `permission`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedSection {
    pub prefix: String,
    pub permission: String,
}

impl ProtectedSection {
    pub fn new(prefix: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            permission: permission.into(),
        }
    }

    /// Segment-aware prefix match: `/users` covers `/users` and `/users/7`,
    /// not `/usersettings`.
    pub fn covers(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be an absolute path, got '{value}'")]
    NotAbsolute { field: &'static str, value: String },

    #[error("redirect_param must not be empty")]
    EmptyRedirectParam,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Sign-in entry point for unauthenticated navigations.
    pub sign_in_path: String,
    /// Generic error destination for forbidden navigations.
    pub forbidden_path: String,
    /// Query parameter carrying the return path on the sign-in redirect.
    pub redirect_param: String,
    pub protected_sections: Vec<ProtectedSection>,
    pub refresh_cooldown_secs: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            sign_in_path: "/auth/login".to_string(),
            forbidden_path: "/error/403".to_string(),
            redirect_param: "redirect".to_string(),
            protected_sections: vec![
                ProtectedSection::new("/users", "users"),
                ProtectedSection::new("/settings", "settings"),
                ProtectedSection::new("/finance", "finance"),
                ProtectedSection::new("/beetrader", "beetrader"),
                ProtectedSection::new("/tasks", "tasks"),
            ],
            refresh_cooldown_secs: 60,
        }
    }
}

impl GuardConfig {
    /// Defaults overridden by `WARDEN_SIGN_IN_PATH`, `WARDEN_FORBIDDEN_PATH`
    /// and `WARDEN_REFRESH_COOLDOWN_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("WARDEN_SIGN_IN_PATH") {
            config.sign_in_path = path;
        }
        if let Some(path) = lookup("WARDEN_FORBIDDEN_PATH") {
            config.forbidden_path = path;
        }
        if let Some(raw) = lookup("WARDEN_REFRESH_COOLDOWN_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) => config.refresh_cooldown_secs = secs,
                Err(_) => tracing::warn!(
                    value = %raw,
                    "WARDEN_REFRESH_COOLDOWN_SECS is not a number; using {}s",
                    config.refresh_cooldown_secs
                ),
            }
        }

        if let Err(e) = config.validate() {
            tracing::warn!(
                error = %e,
                "invalid guard configuration from environment; using defaults"
            );
            return Self::default();
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let absolute = [
            ("sign_in_path", &self.sign_in_path),
            ("forbidden_path", &self.forbidden_path),
        ];
        for (field, value) in absolute {
            if !value.starts_with('/') {
                return Err(ConfigError::NotAbsolute {
                    field,
                    value: value.clone(),
                });
            }
        }
        for section in &self.protected_sections {
            if !section.prefix.starts_with('/') {
                return Err(ConfigError::NotAbsolute {
                    field: "protected_sections.prefix",
                    value: section.prefix.clone(),
                });
            }
        }
        if self.redirect_param.is_empty() {
            return Err(ConfigError::EmptyRedirectParam);
        }
        Ok(())
    }

    pub fn refresh_cooldown(&self) -> Duration {
        Duration::from_secs(self.refresh_cooldown_secs)
    }

    pub fn freshness_policy(&self) -> FreshnessPolicy {
        FreshnessPolicy::new(self.refresh_cooldown())
    }

    /// Permission key guarding `path`, from the longest matching section.
    pub fn section_permission(&self, path: &str) -> Option<&str> {
        self.protected_sections
            .iter()
            .filter(|s| s.covers(path))
            .max_by_key(|s| s.prefix.trim_end_matches('/').len())
            .map(|s| s.permission.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn section_matching_is_segment_aware() {
        let config = GuardConfig::default();
        assert_eq!(config.section_permission("/users"), Some("users"));
        assert_eq!(config.section_permission("/users/42/edit"), Some("users"));
        assert_eq!(config.section_permission("/usersettings"), None);
        assert_eq!(config.section_permission("/"), None);
        assert_eq!(config.section_permission("/dashboard"), None);
    }

    #[test]
    fn longest_prefix_wins() {
        let mut config = GuardConfig::default();
        config
            .protected_sections
            .push(ProtectedSection::new("/finance/reports/", "finance.reports"));

        assert_eq!(config.section_permission("/finance/expenses"), Some("finance"));
        assert_eq!(config.section_permission("/finance/reports/q3"), Some("finance.reports"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = GuardConfig::from_lookup(lookup(&[
            ("WARDEN_SIGN_IN_PATH", "/login"),
            ("WARDEN_REFRESH_COOLDOWN_SECS", "120"),
        ]));
        assert_eq!(config.sign_in_path, "/login");
        assert_eq!(config.forbidden_path, "/error/403");
        assert_eq!(config.refresh_cooldown(), Duration::from_secs(120));
    }

    #[test]
    fn bad_environment_values_fall_back() {
        let config = GuardConfig::from_lookup(lookup(&[("WARDEN_REFRESH_COOLDOWN_SECS", "soon")]));
        assert_eq!(config.refresh_cooldown_secs, 60);

        let config = GuardConfig::from_lookup(lookup(&[("WARDEN_FORBIDDEN_PATH", "error")]));
        assert_eq!(config, GuardConfig::default());
    }

    #[test]
    fn deserializes_partial_json() {
        let raw = r#"{"forbidden_path":"/denied","protected_sections":[]}"#;
        let config: GuardConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.forbidden_path, "/denied");
        assert_eq!(config.sign_in_path, "/auth/login");
        assert!(config.protected_sections.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_relative_paths() {
        let config = GuardConfig {
            sign_in_path: "login".to_string(),
            ..GuardConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotAbsolute { field: "sign_in_path", .. })
        ));
    }
}
