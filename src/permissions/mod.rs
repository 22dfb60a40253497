//! Permission contract and stock policies.

use axum::http::request::Parts;

use crate::gate::RequestContext;

/// Pluggable permission strategy: decides whether an identified (or
/// anonymous) request may proceed.
pub trait Permission: Send + Sync {
    fn has_permission(&self, ctx: &RequestContext, req: &Parts) -> bool;

    /// Human-readable denial message, when this permission customizes it.
    fn message(&self) -> Option<String> {
        None
    }

    /// Machine-readable denial code, when this permission customizes it.
    fn code(&self) -> Option<String> {
        None
    }
}

/// Permits every request.
pub struct AllowAny;

impl Permission for AllowAny {
    fn has_permission(&self, _ctx: &RequestContext, _req: &Parts) -> bool {
        true
    }
}

/// Denies every request. Used for lockdown routes and tests.
pub struct DenyAll;

impl Permission for DenyAll {
    fn has_permission(&self, _ctx: &RequestContext, _req: &Parts) -> bool {
        false
    }

    fn message(&self) -> Option<String> {
        Some("this endpoint is not available".to_string())
    }

    fn code(&self) -> Option<String> {
        Some("deny_all".to_string())
    }
}
