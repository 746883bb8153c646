//! Edge request gateway library.
//!
//! A single pipeline that intercepts every inbound HTTP request before it
//! reaches application code and decides, deterministically, whether to
//! throttle it, redirect it, attach security headers and forward it, or
//! reject it.

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod session;

pub use config::GatewayConfig;
pub use gateway::{Decision, Gateway, GatewayRequest};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use security::rate_limit::{ClientKey, FixedWindowStore, RateLimitStore};
pub use session::{Principal, SessionOutcome, SessionResolver};
