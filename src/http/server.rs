//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway as middleware
//! - Wire up middleware (tracing, timeout, request ID)
//! - Extract client key and origin from the transport layer
//! - Translate gateway Decisions into HTTP responses
//! - Run background sweep of expired rate windows
//!
//! # Design Decisions
//! - Exclusion check runs in the transport layer, before the gateway, so
//!   static-asset traffic creates no rate-limit state
//! - Allowed requests reach a placeholder upstream handler; a real
//!   deployment mounts its application router there

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::gateway::{Decision, Gateway, GatewayRequest, Origin};
use crate::lifecycle::{shutdown_signal, Shutdown};
use crate::routing::ExclusionMatcher;
use crate::security::rate_limit::{self, ClientKey, FixedWindowStore, RateLimitStore};
use crate::session::SessionResolver;

/// Application state injected into the gateway middleware.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub exclusions: Arc<ExclusionMatcher>,
}

/// HTTP server hosting the gateway pipeline.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    store: Arc<dyn RateLimitStore>,
}

impl GatewayServer {
    /// Create a server with the default in-memory rate-limit store.
    pub fn new(config: GatewayConfig, resolver: Arc<dyn SessionResolver>) -> Self {
        let store: Arc<dyn RateLimitStore> =
            Arc::new(FixedWindowStore::from_config(&config.rate_limit));
        Self::with_store(config, resolver, store)
    }

    /// Create a server with an injected rate-limit store (e.g., a shared
    /// backend for multi-instance deployments).
    pub fn with_store(
        config: GatewayConfig,
        resolver: Arc<dyn SessionResolver>,
        store: Arc<dyn RateLimitStore>,
    ) -> Self {
        let gateway = Arc::new(Gateway::new(&config, store.clone(), resolver));
        let state = AppState {
            gateway,
            exclusions: Arc::new(ExclusionMatcher::from_config(&config.exclusions)),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            store,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(upstream_handler))
            .route("/", any(upstream_handler))
            .layer(middleware::from_fn_with_state(state, gateway_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway listening");

        let shutdown = Shutdown::new();

        if self.config.rate_limit.enabled {
            let store = self.store.clone();
            let interval = Duration::from_secs(self.config.rate_limit.sweep_interval_secs);
            let mut stop = shutdown.subscribe();
            tokio::spawn(async move {
                tokio::select! {
                    _ = rate_limit::sweep_task(store.clone(), interval) => {}
                    _ = stop.recv() => {
                        tracing::debug!("Sweep task stopping");
                    }
                }
            });
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                shutdown.trigger();
            })
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The rate-limit store backing this server.
    pub fn store(&self) -> Arc<dyn RateLimitStore> {
        self.store.clone()
    }

    /// The assembled router, for driving the pipeline in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Gateway middleware: one decision per request.
async fn gateway_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    // Transport-layer bypass: excluded paths never enter the pipeline.
    if state.exclusions.is_excluded(&path) {
        return next.run(request).await;
    }

    let decision = state
        .gateway
        .decide(GatewayRequest {
            path: &path,
            client_key: extract_client_key(&request),
            origin: extract_origin(&request),
            headers: request.headers(),
        })
        .await;

    match decision {
        Decision::Allow { headers } => {
            let mut response = next.run(request).await;
            merge_headers(response.headers_mut(), &headers);
            response
        }
        Decision::Redirect { location } => match HeaderValue::from_str(&location) {
            Ok(value) => {
                (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, value)]).into_response()
            }
            Err(_) => {
                // Unrepresentable Location is a programming defect upstream;
                // degrade to allowing the request rather than failing closed
                // on public traffic.
                tracing::error!(%location, "Redirect target is not a valid header value");
                next.run(request).await
            }
        },
        Decision::Reject { status, body } => (status, Json(body)).into_response(),
    }
}

/// Merge decision headers into the downstream response.
///
/// Set-Cookie is append-valued: refreshed session cookies must coexist with
/// any cookies the application sets. Everything else is single-valued and
/// the gateway wins.
fn merge_headers(target: &mut axum::http::HeaderMap, decided: &axum::http::HeaderMap) {
    for (name, value) in decided.iter() {
        if name == header::SET_COOKIE {
            target.append(name.clone(), value.clone());
        } else {
            target.insert(name.clone(), value.clone());
        }
    }
}

/// Derive the rate-limit bucket key for a request.
///
/// Proxy-supplied headers take precedence over the peer address; with no
/// address information at all, the shared sentinel key is used.
fn extract_client_key<B>(request: &Request<B>) -> ClientKey {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return ClientKey::new(first);
                }
            }
        }
    }

    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            if !value.is_empty() {
                return ClientKey::new(value.trim());
            }
        }
    }

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return ClientKey::new(addr.ip().to_string());
    }

    ClientKey::unknown()
}

/// Derive the request origin used for absolute redirect targets.
fn extract_origin<B>(request: &Request<B>) -> Origin {
    let scheme = request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");

    let host = request
        .uri()
        .authority()
        .map(|a| a.as_str())
        .or_else(|| {
            request
                .headers()
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
        })
        .unwrap_or("");

    Origin::new(scheme, host)
}

/// Placeholder application handler.
///
/// Real deployments mount their application router here; the gateway has
/// already made its decision by the time this runs.
async fn upstream_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
