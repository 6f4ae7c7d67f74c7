//! Path matching for the request gate.

use serde::{Deserialize, Serialize};

fn default_include() -> Vec<String> {
    vec!["/api/*".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec!["/api/health".to_string()]
}

/// Which request paths the gate applies to.
///
/// Patterns are exact paths or prefix globs with a trailing `*`
/// (`/api/*` matches `/api/checkout` and `/api/admin/settings`). Excludes
/// win over includes, so a health endpoint stays reachable no matter how
/// broad the include list is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathMatcher {
    /// Paths the limiter applies to.
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    /// Paths that bypass the limiter unconditionally.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
        }
    }
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => path.starts_with(prefix),
        None => path == pattern,
    }
}

impl PathMatcher {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Whether a request to `path` must pass the limiter.
    pub fn should_limit(&self, path: &str) -> bool {
        if self.exclude.iter().any(|p| pattern_matches(p, path)) {
            return false;
        }
        self.include.iter().any(|p| pattern_matches(p, path))
    }
}
