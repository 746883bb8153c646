//! Route classification logic.
//!
//! # Responsibilities
//! - Map a request path to exactly one access-control category
//! - Match configured path-prefix sets (case-sensitive)
//!
//! # Design Decisions
//! - Prefix sets compiled at startup, immutable at runtime
//! - No regex to guarantee O(n) matching
//! - Sets are disjoint by construction (validation rejects overlaps), so
//!   evaluation order never decides a well-configured request
//! - Public is the default, never an error

use crate::config::RoutePolicyConfig;

/// Access-control category of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCategory {
    /// Auth pages; an existing session gets bounced home.
    AuthOnly,
    /// Requires a session; anonymous requests redirect to login.
    Protected,
    /// Admin area; session presence checked, roles downstream.
    Admin,
    /// API routes, subject to rate limiting.
    Api,
    /// Everything else.
    Public,
}

impl RouteCategory {
    /// Stable lowercase name, used as a metrics label.
    pub fn as_str(self) -> &'static str {
        match self {
            RouteCategory::AuthOnly => "auth_only",
            RouteCategory::Protected => "protected",
            RouteCategory::Admin => "admin",
            RouteCategory::Api => "api",
            RouteCategory::Public => "public",
        }
    }
}

/// Classifies paths against the configured prefix sets.
#[derive(Debug, Clone)]
pub struct RouteClassifier {
    api_prefix: String,
    auth_only: Vec<String>,
    protected: Vec<String>,
    admin: Vec<String>,
}

impl RouteClassifier {
    /// Compile a classifier from route policy configuration.
    pub fn from_config(policy: &RoutePolicyConfig) -> Self {
        Self {
            api_prefix: policy.api_prefix.clone(),
            auth_only: policy.auth_only.clone(),
            protected: policy.protected.clone(),
            admin: policy.admin.clone(),
        }
    }

    /// Classify a path. Total: always returns exactly one category.
    pub fn classify(&self, path: &str) -> RouteCategory {
        if path.starts_with(&self.api_prefix) {
            RouteCategory::Api
        } else if matches_any(&self.auth_only, path) {
            RouteCategory::AuthOnly
        } else if matches_any(&self.protected, path) {
            RouteCategory::Protected
        } else if matches_any(&self.admin, path) {
            RouteCategory::Admin
        } else {
            RouteCategory::Public
        }
    }
}

fn matches_any(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|p| path.starts_with(p.as_str()))
}
