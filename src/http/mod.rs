//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → exclusion check (transport-layer bypass)
//!     → gateway middleware (decision per request)
//!     → upstream handler (application code placeholder)
//! ```

pub mod server;

pub use server::{AppState, GatewayServer};
