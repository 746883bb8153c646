//! Security response headers.
//!
//! # Responsibilities
//! - Attach the fixed security header set to outgoing responses
//!
//! # Design Decisions
//! - Fixed set, no per-request variation
//! - `insert` (not `append`) makes reapplication idempotent
//! - Static values only, so construction cannot fail

use axum::http::{header, HeaderMap, HeaderValue};

/// Injects the fixed security header set into response headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityHeaders;

impl SecurityHeaders {
    /// Apply the header set. Idempotent: applying twice yields the same map.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(
            header::X_DNS_PREFETCH_CONTROL,
            HeaderValue::from_static("on"),
        );
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains; preload"),
        );
        headers.insert(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        );
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
        headers.insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
        headers.insert(
            header::REFERRER_POLICY,
            HeaderValue::from_static("origin-when-cross-origin"),
        );
    }
}
