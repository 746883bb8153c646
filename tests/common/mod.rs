//! Shared utilities for integration testing.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue};
use axum::Router;

use edge_gateway::config::GatewayConfig;
use edge_gateway::http::GatewayServer;
use edge_gateway::security::rate_limit::{FixedWindowStore, RateLimitStore};
use edge_gateway::session::{Principal, SessionError, SessionOutcome, SessionResolver};

/// Session resolver with a scripted outcome.
pub struct StaticResolver {
    principal: Option<Principal>,
    cookies: Vec<&'static str>,
    fail: bool,
}

impl StaticResolver {
    /// Every request resolves anonymous, with a refreshed session cookie.
    pub fn anonymous() -> Self {
        Self {
            principal: None,
            cookies: vec!["sid=refreshed"],
            fail: false,
        }
    }

    /// Every request resolves to the given user.
    #[allow(dead_code)]
    pub fn signed_in(id: &str) -> Self {
        Self {
            principal: Some(Principal::new(id)),
            cookies: vec!["sid=refreshed"],
            fail: false,
        }
    }

    /// Every resolution fails (credential provider down).
    #[allow(dead_code)]
    pub fn failing() -> Self {
        Self {
            principal: None,
            cookies: vec![],
            fail: true,
        }
    }
}

#[async_trait]
impl SessionResolver for StaticResolver {
    async fn resolve(&self, _headers: &HeaderMap) -> Result<SessionOutcome, SessionError> {
        if self.fail {
            return Err(SessionError::Unavailable("scripted failure".into()));
        }
        let mut carrier = HeaderMap::new();
        for cookie in &self.cookies {
            carrier.append("set-cookie", HeaderValue::from_static(cookie));
        }
        Ok(SessionOutcome {
            principal: self.principal.clone(),
            carrier,
        })
    }
}

/// Build a router under test plus a handle on its rate-limit store.
pub fn test_router(
    config: GatewayConfig,
    resolver: StaticResolver,
) -> (Router, Arc<dyn RateLimitStore>) {
    let store: Arc<dyn RateLimitStore> =
        Arc::new(FixedWindowStore::from_config(&config.rate_limit));
    let server = GatewayServer::with_store(config, Arc::new(resolver), store.clone());
    (server.router(), store)
}
