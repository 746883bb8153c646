//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → exclusions.rs (transport-layer bypass check)
//!     → classifier.rs (prefix-set membership)
//!     → Return: RouteCategory (Public by default)
//!
//! Policy Compilation (at startup):
//!     RoutePolicyConfig
//!     → Validate disjointness (config::validation)
//!     → Freeze as immutable RouteClassifier
//! ```
//!
//! # Design Decisions
//! - Prefix sets compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same path always classifies the same way

pub mod classifier;
pub mod exclusions;

pub use classifier::{RouteCategory, RouteClassifier};
pub use exclusions::ExclusionMatcher;
