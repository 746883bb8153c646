//! Session resolution capability.
//!
//! The gateway never performs authentication itself. It consumes an opaque
//! resolver that, given the request headers, returns the authenticated
//! principal (if any) plus a carrier header map holding refreshed session
//! cookies. Token formats and cookie encryption live behind this trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use thiserror::Error;

/// Authenticated-identity handle.
///
/// Deliberately opaque: no role or admin flag at this layer. Downstream code
/// must perform its own authorization check; the gateway only proves that
/// some session exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    id: String,
}

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Result of one session resolution.
#[derive(Debug, Clone, Default)]
pub struct SessionOutcome {
    /// The authenticated user, absent for anonymous requests.
    pub principal: Option<Principal>,

    /// Headers carrying refreshed session cookies. Base for all header
    /// mutations on allow paths; never discarded there.
    pub carrier: HeaderMap,
}

impl SessionOutcome {
    /// An anonymous outcome with no cookies to carry.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Errors a resolver may surface. The gateway maps all of them to an
/// anonymous outcome; gated routes then fail closed by guard order.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("credential provider unreachable: {0}")]
    Unavailable(String),

    #[error("session lookup failed: {0}")]
    Lookup(String),
}

/// Capability that resolves the session for a request.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Look up and refresh the session for a request.
    ///
    /// Suspending and I/O-bound; the gateway wraps calls in a timeout.
    async fn resolve(&self, request_headers: &HeaderMap) -> Result<SessionOutcome, SessionError>;
}

/// Resolver that treats every request as anonymous.
///
/// Default wiring for deployments where the application performs its own
/// session handling downstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousResolver;

#[async_trait]
impl SessionResolver for AnonymousResolver {
    async fn resolve(&self, _request_headers: &HeaderMap) -> Result<SessionOutcome, SessionError> {
        Ok(SessionOutcome::anonymous())
    }
}

/// Resolve with an upper bound on wall-clock time.
///
/// Timeouts and resolver errors both degrade to an anonymous outcome: public
/// and auth-only routes stay available, protected and admin routes redirect
/// to login.
pub async fn resolve_with_timeout(
    resolver: &Arc<dyn SessionResolver>,
    request_headers: &HeaderMap,
    timeout: Duration,
) -> SessionOutcome {
    match tokio::time::timeout(timeout, resolver.resolve(request_headers)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(error)) => {
            tracing::warn!(%error, "Session resolution failed, treating as anonymous");
            SessionOutcome::anonymous()
        }
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Session resolution timed out, treating as anonymous");
            SessionOutcome::anonymous()
        }
    }
}
