//! End-to-end gate behavior through the Axum middleware.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::{middleware, routing::get, Extension, Router};
use serde_json::Value;
use tower::ServiceExt;

use request_gate::gate::{PolicySet, RequestContext, RequestGate, ViewPolicy};
use request_gate::http::{gate_middleware, GateState};
use request_gate::permissions::{AllowAny, DenyAll, Permission};

use common::{BearerAuth, FailingAuth, StaticThrottleFactory};

async fn handler() -> &'static str {
    "ok"
}

fn gated_router(gate: Arc<RequestGate>) -> Router {
    Router::new().route("/", get(handler)).layer(
        middleware::from_fn_with_state(GateState::new(gate), gate_middleware),
    )
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// Scenario A: no authenticators, one allowing permission, no throttles.
#[tokio::test]
async fn open_route_reaches_the_handler() {
    let gate = Arc::new(RequestGate::new(
        PolicySet::new().with_permission(Arc::new(AllowAny)),
    ));

    let response = gated_router(gate)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

// Scenario B: a failing authenticator turns into 401 with its challenge.
#[tokio::test]
async fn failing_authenticator_yields_401_with_challenge() {
    let gate = Arc::new(RequestGate::new(
        PolicySet::new()
            .with_authenticator(Arc::new(FailingAuth { header: "Token realm=\"api\"" }))
            .with_permission(Arc::new(AllowAny)),
    ));

    let response = gated_router(gate)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Token realm=\"api\""
    );
    let json = body_json(response).await;
    assert_eq!(json["code"], "not_authenticated");
}

// Scenario C: both throttles deny; the longest wait governs Retry-After.
#[tokio::test]
async fn throttled_response_carries_longest_wait() {
    let gate = Arc::new(RequestGate::new(
        PolicySet::new()
            .with_throttle(StaticThrottleFactory::denying(5))
            .with_throttle(StaticThrottleFactory::denying(2)),
    ));

    let response = gated_router(gate)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "5");
    let json = body_json(response).await;
    assert_eq!(json["code"], "throttled");
}

// Scenario D: an explicitly empty view override beats a denying default.
#[tokio::test]
async fn empty_view_override_beats_denying_default() {
    let gate = Arc::new(RequestGate::new(
        PolicySet::new().with_permission(Arc::new(DenyAll)),
    ));

    let overridden = Router::new().route("/", get(handler)).layer(
        middleware::from_fn_with_state(
            GateState::with_view(
                Arc::clone(&gate),
                ViewPolicy::inherit().permissions(Vec::new()),
            ),
            gate_middleware,
        ),
    );
    let response = overridden
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The same gate without an override still denies.
    let inherited = gated_router(gate);
    let response = inherited
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn denying_permission_reports_its_metadata() {
    let gate = Arc::new(RequestGate::new(
        PolicySet::new().with_permission(Arc::new(DenyAll)),
    ));

    let response = gated_router(gate)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "deny_all");
    assert_eq!(json["detail"], "this endpoint is not available");
}

#[tokio::test]
async fn context_is_attached_for_the_handler() {
    async fn who(Extension(ctx): Extension<RequestContext>) -> String {
        ctx.identity().map(|id| id.user.clone()).unwrap_or_default()
    }

    let gate = Arc::new(RequestGate::new(
        PolicySet::new()
            .with_authenticator(Arc::new(BearerAuth))
            .with_permission(Arc::new(AllowAny)),
    ));
    let app = Router::new().route("/", get(who)).layer(
        middleware::from_fn_with_state(GateState::new(gate), gate_middleware),
    );

    let response = app
        .oneshot(
            Request::get("/")
                .header(header::AUTHORIZATION, "Bearer alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&bytes[..], b"alice");
}

#[tokio::test]
async fn malformed_credentials_yield_401_with_detail() {
    let gate = Arc::new(RequestGate::new(
        PolicySet::new()
            .with_authenticator(Arc::new(BearerAuth))
            .with_permission(Arc::new(AllowAny)),
    ));

    let response = gated_router(gate)
        .oneshot(
            Request::get("/")
                .header(header::AUTHORIZATION, "Basic Zm9vOmJhcg==")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer realm=\"api\""
    );
    let json = body_json(response).await;
    assert_eq!(json["code"], "authentication_failed");
    assert_eq!(json["detail"], "malformed bearer credentials");
}

// One permission object shared between groups: Arc'd strategies are reused,
// not merged, across view policies.
#[tokio::test]
async fn shared_strategies_across_groups() {
    let deny: Arc<dyn Permission> = Arc::new(DenyAll);
    let gate = Arc::new(RequestGate::new(PolicySet::new()));

    let locked = Router::new().route("/locked", get(handler)).layer(
        middleware::from_fn_with_state(
            GateState::with_view(
                Arc::clone(&gate),
                ViewPolicy::inherit().permissions(vec![Arc::clone(&deny)]),
            ),
            gate_middleware,
        ),
    );
    let open = Router::new().route("/open", get(handler)).layer(
        middleware::from_fn_with_state(GateState::new(Arc::clone(&gate)), gate_middleware),
    );
    let app = locked.merge(open);

    let response = app
        .clone()
        .oneshot(Request::get("/locked").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(Request::get("/open").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
