//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limits).
    pub listener: ListenerConfig,

    /// Route classification policy (path-prefix sets).
    pub routes: RoutePolicyConfig,

    /// Paths that bypass the gateway entirely.
    pub exclusions: ExclusionConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Session resolution settings.
    pub session: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Path-prefix sets driving route classification.
///
/// The four sets must be mutually disjoint; overlaps are rejected by
/// validation at load time, not resolved at request time.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutePolicyConfig {
    /// Prefix identifying API routes (rate-limited).
    pub api_prefix: String,

    /// Auth pages: redirected home when a session already exists.
    pub auth_only: Vec<String>,

    /// Routes requiring a session; anonymous requests redirect to login.
    pub protected: Vec<String>,

    /// Admin routes; session presence is checked here, roles downstream.
    pub admin: Vec<String>,
}

impl Default for RoutePolicyConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api/".to_string(),
            auth_only: vec!["/login".to_string(), "/register".to_string()],
            protected: vec![
                "/account".to_string(),
                "/orders".to_string(),
                "/checkout".to_string(),
                "/wishlist".to_string(),
            ],
            admin: vec!["/admin".to_string()],
        }
    }
}

/// Static-asset paths that never enter the gateway pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExclusionConfig {
    /// Path prefixes excluded at the transport-routing layer.
    pub prefixes: Vec<String>,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            prefixes: vec![
                "/_static/".to_string(),
                "/assets/".to_string(),
                "/images/".to_string(),
                "/public/".to_string(),
                "/favicon.ico".to_string(),
            ],
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests per client key per window.
    pub max_requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Interval between sweeps of expired windows, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 60,
            sweep_interval_secs: 60,
        }
    }
}

/// Session resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Upper bound on a single session resolution, in milliseconds.
    /// A resolver that exceeds it is treated as returning no principal.
    pub resolve_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            resolve_timeout_ms: 5_000,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security response headers.
    pub enable_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
        }
    }
}
