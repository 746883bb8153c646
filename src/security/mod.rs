//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (check per-client window, API paths only)
//!     → [gateway guards decide allow/redirect/reject]
//!     → headers.rs (attach security headers on allow paths)
//! ```
//!
//! # Design Decisions
//! - Rate check runs before any suspending work
//! - Unidentifiable clients share one bucket rather than bypassing the limiter
//! - Header set is fixed; idempotent application

pub mod headers;
pub mod rate_limit;

pub use headers::SecurityHeaders;
pub use rate_limit::{ClientKey, FixedWindowStore, RateDecision, RateLimitStore};
