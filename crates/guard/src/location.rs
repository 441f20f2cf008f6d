//! Navigation targets: where the user is going and where they get sent.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use warden_core::{AccessError, AccessResult};

/// A destination inside the console: path plus raw query string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    /// Raw query string including the leading `?`, or empty.
    #[serde(default)]
    pub search: String,
}

impl Location {
    pub fn new(path: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            search: search.into(),
        }
    }

    /// Split an href into path and query. The fragment is dropped.
    pub fn parse(href: &str) -> Self {
        let href = href.split('#').next().unwrap_or_default();
        match href.split_once('?') {
            Some((path, query)) => Self::new(path, format!("?{query}")),
            None => Self::new(href, ""),
        }
    }

    /// First value of a query parameter, percent-decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.search.strip_prefix('?').unwrap_or(&self.search);
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// A redirect handed to the routing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
    pub query: Vec<(String, String)>,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            to: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Path with the query encoded, e.g. `/auth/login?redirect=%2Fusers`.
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            return self.to.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.to, query)
    }
}

/// Sanitized path + query to return to after signing in.
///
/// Always a same-origin absolute path. Anything else collapses to `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RedirectTarget(String);

impl RedirectTarget {
    pub const ROOT: &'static str = "/";

    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    /// Join path and query; a missing half counts as empty.
    pub fn capture(path: Option<&str>, search: Option<&str>) -> Self {
        let path = path.unwrap_or_default();
        let search = search.unwrap_or_default();
        let raw = if search.is_empty() || search.starts_with('?') {
            format!("{path}{search}")
        } else {
            format!("{path}?{search}")
        };

        Self::parse(&raw).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "discarding redirect target");
            Self::root()
        })
    }

    pub fn from_location(location: &Location) -> Self {
        Self::capture(Some(&location.path), Some(&location.search))
    }

    pub fn parse(raw: &str) -> AccessResult<Self> {
        if raw.is_empty() {
            return Err(AccessError::malformed("empty redirect target"));
        }
        if raw == "undefinedundefined" || raw.contains("[object") {
            return Err(AccessError::malformed(format!("unserialized value '{raw}'")));
        }
        if !raw.starts_with('/') || raw.starts_with("//") {
            return Err(AccessError::malformed(format!("not a local path '{raw}'")));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_path_and_query() {
        let target = RedirectTarget::capture(Some("/finance/expenses"), Some("?page=2"));
        assert_eq!(target.as_str(), "/finance/expenses?page=2");

        let target = RedirectTarget::capture(Some("/tasks"), Some("status=open"));
        assert_eq!(target.as_str(), "/tasks?status=open");

        let target = RedirectTarget::capture(Some("/tasks"), None);
        assert_eq!(target.as_str(), "/tasks");
    }

    #[test]
    fn malformed_targets_collapse_to_root() {
        let cases = [
            (Some("undefined"), Some("undefined")),
            (Some("[object Object]"), None),
            (Some("/users"), Some("?next=[object Object]")),
            (None, None),
            (Some("https://evil.example"), None),
            (Some("//evil.example/path"), None),
        ];
        for (path, search) in cases {
            assert_eq!(
                RedirectTarget::capture(path, search).as_str(),
                "/",
                "{path:?} {search:?}"
            );
        }
    }

    #[test]
    fn parse_reports_malformed_navigation() {
        let err = RedirectTarget::parse("undefinedundefined").unwrap_err();
        assert!(matches!(err, AccessError::MalformedNavigation(_)));
    }

    #[test]
    fn location_parse_splits_query_and_drops_fragment() {
        let location = Location::parse("/finance/expenses?page=2#top");
        assert_eq!(location, Location::new("/finance/expenses", "?page=2"));
        assert_eq!(Location::parse("/tasks"), Location::new("/tasks", ""));
    }

    #[test]
    fn redirect_href_round_trips_through_query_param() {
        let redirect =
            Redirect::to("/auth/login").with_query("redirect", "/finance/expenses?page=2");
        let href = redirect.href();
        assert_eq!(href, "/auth/login?redirect=%2Ffinance%2Fexpenses%3Fpage%3D2");

        let landed = Location::parse(&href);
        assert_eq!(
            landed.query_param("redirect").as_deref(),
            Some("/finance/expenses?page=2")
        );
        assert_eq!(Redirect::to("/error/403").href(), "/error/403");
    }
}
