//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the four route sets are mutually disjoint
//! - Validate value ranges (window > 0, limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Config field the error refers to (e.g., "rate_limit.window_secs").
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address".to_string(),
            message: format!("not a valid socket address: {}", config.listener.bind_address),
        });
    }

    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError {
            field: "rate_limit.window_secs".to_string(),
            message: "window must be greater than zero".to_string(),
        });
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError {
            field: "rate_limit.max_requests".to_string(),
            message: "request limit must be greater than zero".to_string(),
        });
    }
    if config.session.resolve_timeout_ms == 0 {
        errors.push(ValidationError {
            field: "session.resolve_timeout_ms".to_string(),
            message: "resolution timeout must be greater than zero".to_string(),
        });
    }

    let sets: [(&str, &[String]); 3] = [
        ("routes.auth_only", &config.routes.auth_only),
        ("routes.protected", &config.routes.protected),
        ("routes.admin", &config.routes.admin),
    ];

    check_prefix_shape(&mut errors, "routes.api_prefix", &config.routes.api_prefix);
    for (field, prefixes) in sets {
        for prefix in prefixes {
            check_prefix_shape(&mut errors, field, prefix);
        }
    }
    for prefix in &config.exclusions.prefixes {
        check_prefix_shape(&mut errors, "exclusions.prefixes", prefix);
    }

    // The route sets must be disjoint: one path, one category. An overlap is
    // a configuration error, never resolved by precedence at runtime.
    for (i, (field_a, set_a)) in sets.iter().enumerate() {
        for prefix_a in set_a.iter() {
            if prefix_a.starts_with(&config.routes.api_prefix)
                || config.routes.api_prefix.starts_with(prefix_a.as_str())
            {
                errors.push(ValidationError {
                    field: field_a.to_string(),
                    message: format!(
                        "prefix '{}' overlaps api prefix '{}'",
                        prefix_a, config.routes.api_prefix
                    ),
                });
            }
            for (field_b, set_b) in sets.iter().skip(i + 1) {
                for prefix_b in set_b.iter() {
                    if prefix_a.starts_with(prefix_b.as_str())
                        || prefix_b.starts_with(prefix_a.as_str())
                    {
                        errors.push(ValidationError {
                            field: field_a.to_string(),
                            message: format!(
                                "prefix '{}' overlaps '{}' in {}",
                                prefix_a, prefix_b, field_b
                            ),
                        });
                    }
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_prefix_shape(errors: &mut Vec<ValidationError>, field: &str, prefix: &str) {
    if !prefix.starts_with('/') {
        errors.push(ValidationError {
            field: field.to_string(),
            message: format!("prefix '{}' must start with '/'", prefix),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::GatewayConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = GatewayConfig::default();
        config.rate_limit.window_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "rate_limit.window_secs"));
    }

    #[test]
    fn test_overlapping_sets_rejected() {
        let mut config = GatewayConfig::default();
        config.routes.protected.push("/admin".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("/admin")));
    }

    #[test]
    fn test_prefix_overlapping_api_rejected() {
        let mut config = GatewayConfig::default();
        config.routes.protected.push("/api/orders".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_relative_prefix_rejected() {
        let mut config = GatewayConfig::default();
        config.routes.admin.push("admin".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("must start with '/'")));
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = GatewayConfig::default();
        config.rate_limit.window_secs = 0;
        config.rate_limit.max_requests = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
