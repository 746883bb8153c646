//! Static-asset exclusion matching.
//!
//! Excluded paths bypass the entire gateway pipeline at the transport-routing
//! layer: no rate-limit record, no session resolution, no header mutation.

use crate::config::schema::ExclusionConfig;

/// Matches request paths that must never enter the gateway.
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    prefixes: Vec<String>,
}

impl ExclusionMatcher {
    pub fn from_config(config: &ExclusionConfig) -> Self {
        Self {
            prefixes: config.prefixes.clone(),
        }
    }

    /// Returns true if the path is excluded from gateway processing.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}
