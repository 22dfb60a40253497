//! The initial-phase dispatch sequence.
//!
//! # Data Flow
//! ```text
//! incoming request head
//!     → resolve policies (view override or process default)
//!     → perform_authentication   (first success wins)
//!     → check_permissions        (first denial wins)
//!     → check_throttles          (all evaluated, max wait wins)
//!     → RequestContext handed to the handler
//!
//! any denial → ApiError → handle_exception → HTTP response
//! ```
//!
//! Denial is an explicit `Result`, not unwinding: each step returns
//! `Err(ApiError)` and the sequence short-circuits to the exception handler
//! at the dispatch boundary.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::request::Parts;
use axum::response::Response;

use crate::errors::ApiError;
use crate::gate::context::RequestContext;
use crate::gate::policy::{resolve, PolicySet, ResolvedPolicies, ViewPolicy};
use crate::handler::{default_exception_handler, ExceptionHandler};

/// Steps of the initial phase, labelled for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Authentication,
    Permissions,
    Throttling,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Authentication => write!(f, "authentication"),
            Phase::Permissions => write!(f, "permissions"),
            Phase::Throttling => write!(f, "throttling"),
        }
    }
}

/// Per-request coordinator for the initial phase.
///
/// Holds the process-wide policy defaults and the exception handler. The
/// defaults sit behind an [`ArcSwap`] so the host may replace them between
/// requests; in-flight requests keep the set they resolved at dispatch start.
pub struct RequestGate {
    defaults: ArcSwap<PolicySet>,
    exception_handler: ExceptionHandler,
}

impl RequestGate {
    pub fn new(defaults: PolicySet) -> Self {
        Self {
            defaults: ArcSwap::from_pointee(defaults),
            exception_handler: Arc::new(default_exception_handler),
        }
    }

    /// Replace the built-in exception handler.
    pub fn with_exception_handler(mut self, handler: ExceptionHandler) -> Self {
        self.exception_handler = handler;
        self
    }

    /// Replace the process-wide defaults. Later requests observe the new set.
    pub fn set_defaults(&self, defaults: PolicySet) {
        self.defaults.store(Arc::new(defaults));
    }

    /// Run the full initial phase for one request: authenticate, check
    /// permissions, check throttles. Returns the populated context on a pass
    /// and the first denial otherwise. Policies are resolved fresh here.
    pub fn initial(&self, view: &ViewPolicy, req: &Parts) -> Result<RequestContext, ApiError> {
        let policies = resolve(&self.defaults.load(), view);
        let mut ctx = RequestContext::new();

        self.perform_authentication(&policies, &mut ctx, req)
            .map_err(|err| denied(Phase::Authentication, err))?;
        self.check_permissions(&policies, &ctx, req)
            .map_err(|err| denied(Phase::Permissions, err))?;
        self.check_throttles(&policies, &ctx, req)
            .map_err(|err| denied(Phase::Throttling, err))?;

        tracing::debug!(authenticated = ctx.is_authenticated(), "initial phase passed");
        Ok(ctx)
    }

    /// Iterate authenticators in order; stop at the first established
    /// identity. An auth-domain error propagates with the failing
    /// authenticator's challenge attached. Exhaustion leaves the request
    /// unauthenticated with no identity and no error.
    fn perform_authentication(
        &self,
        policies: &ResolvedPolicies,
        ctx: &mut RequestContext,
        req: &Parts,
    ) -> Result<(), ApiError> {
        for authenticator in &policies.authenticators {
            match authenticator.authenticate(req) {
                Err(err) => {
                    return Err(err.with_auth_header(authenticator.authenticate_header()));
                }
                Ok(Some(identity)) => {
                    ctx.set_identity(identity, Arc::clone(authenticator));
                    return Ok(());
                }
                Ok(None) => {}
            }
        }
        ctx.clear_identity();
        Ok(())
    }

    /// Iterate permissions in order; the first denial wins and later
    /// permissions are never evaluated.
    fn check_permissions(
        &self,
        policies: &ResolvedPolicies,
        ctx: &RequestContext,
        req: &Parts,
    ) -> Result<(), ApiError> {
        for permission in &policies.permissions {
            if !permission.has_permission(ctx, req) {
                return Err(self.permission_denied(
                    policies,
                    ctx,
                    permission.message(),
                    permission.code(),
                ));
            }
        }
        Ok(())
    }

    /// Decide what kind of denial to produce. A configured-but-failed
    /// authentication escalates to `NotAuthenticated` (401-equivalent) with
    /// the first configured authenticator's challenge; otherwise the denial
    /// stays `PermissionDenied` (403-equivalent) with the failing
    /// permission's metadata.
    fn permission_denied(
        &self,
        policies: &ResolvedPolicies,
        ctx: &RequestContext,
        message: Option<String>,
        code: Option<String>,
    ) -> ApiError {
        if !policies.authenticators.is_empty() && !ctx.is_authenticated() {
            ApiError::NotAuthenticated {
                auth_header: first_authenticate_header(policies),
            }
        } else {
            ApiError::PermissionDenied { detail: message, code }
        }
    }

    /// Instantiate and run every configured throttle. No short-circuit: each
    /// throttle records the request against its own state even after an
    /// earlier denial. The longest required wait governs retry timing.
    fn check_throttles(
        &self,
        policies: &ResolvedPolicies,
        ctx: &RequestContext,
        req: &Parts,
    ) -> Result<(), ApiError> {
        let mut waits = Vec::new();
        for binding in &policies.throttles {
            let mut throttle = binding.instantiate();
            if !throttle.allow_request(ctx, req) {
                waits.push(throttle.wait());
            }
        }
        match waits.into_iter().max() {
            Some(wait) => Err(ApiError::Throttled { wait }),
            None => Ok(()),
        }
    }

    /// Challenge header for 401 responses: the first configured
    /// authenticator's, or `None` when no authenticators are configured.
    pub fn get_authenticate_header(&self, view: &ViewPolicy) -> Option<String> {
        let policies = resolve(&self.defaults.load(), view);
        first_authenticate_header(&policies)
    }

    /// Map a gate denial to an HTTP response via the configured handler.
    pub fn handle_exception(&self, err: &ApiError) -> Response {
        (self.exception_handler)(err)
    }
}

fn first_authenticate_header(policies: &ResolvedPolicies) -> Option<String> {
    policies
        .authenticators
        .first()
        .map(|authenticator| authenticator.authenticate_header())
}

fn denied(phase: Phase, err: ApiError) -> ApiError {
    tracing::warn!(phase = %phase, code = err.code(), "request denied");
    err
}
