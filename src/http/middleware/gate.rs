//! Gate middleware.
//!
//! Runs the initial phase before the handler body. On a pass the
//! [`RequestContext`](crate::gate::RequestContext) is attached to the request
//! extensions; on a denial the handler body is never invoked and the gate's
//! exception handler produces the response.
//!
//! View-level overrides are wired per route group: each group gets its own
//! [`GateState`] carrying the group's [`ViewPolicy`]. Groups built with
//! [`GateState::new`] inherit every process-wide default.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::errors::ApiError;
use crate::gate::{RequestGate, ViewPolicy};
use crate::observability::metrics;

/// Per-route-group state for the gate middleware: the shared gate plus this
/// group's view policy.
#[derive(Clone)]
pub struct GateState {
    gate: Arc<RequestGate>,
    view: Arc<ViewPolicy>,
}

impl GateState {
    /// Inherit every process-wide default.
    pub fn new(gate: Arc<RequestGate>) -> Self {
        Self {
            gate,
            view: Arc::new(ViewPolicy::inherit()),
        }
    }

    /// Override the policy lists for this route group.
    pub fn with_view(gate: Arc<RequestGate>, view: ViewPolicy) -> Self {
        Self {
            gate,
            view: Arc::new(view),
        }
    }

    pub fn gate(&self) -> &Arc<RequestGate> {
        &self.gate
    }
}

/// Middleware function wiring [`RequestGate::initial`] in front of the
/// handler body.
pub async fn gate_middleware(
    State(state): State<GateState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    match state.gate.initial(&state.view, &parts) {
        Ok(ctx) => {
            metrics::record_gate_allowed();
            parts.extensions.insert(ctx);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(err) => {
            metrics::record_gate_denied(err.code());
            if let ApiError::Throttled { wait } = &err {
                metrics::record_throttle_wait(*wait);
            }
            state.gate.handle_exception(&err)
        }
    }
}
