//! Demo service running behind the request gate.
//!
//! Shows the host-wiring contract: build the policy lists, hand them to a
//! [`RequestGate`], wrap a router with the gate middleware, serve. The
//! strategies here are deliberately small; real services inject their own.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::{routing::get, Extension, Json, Router};
use clap::Parser;
use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use request_gate::auth::{Authenticator, Identity};
use request_gate::config::{load_config, GateConfig};
use request_gate::errors::ApiError;
use request_gate::gate::{PolicySet, RequestContext, RequestGate, ViewPolicy};
use request_gate::http::{gate_middleware, GateServer, GateState};
use request_gate::observability;
use request_gate::permissions::{AllowAny, Permission};
use request_gate::throttling::{Rate, Throttle, ThrottleBinding, ThrottleFactory};

#[derive(Parser)]
#[command(name = "request-gate")]
#[command(about = "Demo service running behind the request gate", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Bearer-token authenticator: `Authorization: Bearer <user>` establishes
/// `<user>`. A non-bearer or empty Authorization header is malformed.
struct BearerAuth;

impl Authenticator for BearerAuth {
    fn authenticate(&self, req: &Parts) -> Result<Option<Identity>, ApiError> {
        let Some(value) = req.headers.get(AUTHORIZATION) else {
            return Ok(None);
        };
        let value = value.to_str().map_err(|_| ApiError::AuthenticationFailed {
            detail: Some("authorization header is not valid UTF-8".into()),
            auth_header: None,
        })?;
        match value.strip_prefix("Bearer ") {
            Some(token) if !token.is_empty() => Ok(Some(Identity::with_credentials(token, token))),
            _ => Err(ApiError::AuthenticationFailed {
                detail: Some("malformed bearer credentials".into()),
                auth_header: None,
            }),
        }
    }

    fn authenticate_header(&self) -> String {
        "Bearer realm=\"api\"".to_string()
    }
}

/// Requires an established identity.
struct IsAuthenticated;

impl Permission for IsAuthenticated {
    fn has_permission(&self, ctx: &RequestContext, _req: &Parts) -> bool {
        ctx.is_authenticated()
    }

    fn message(&self) -> Option<String> {
        Some("authentication required".to_string())
    }
}

/// Fixed-window throttle keyed by user (or "anon"). Window counters are
/// shared across requests through the factory; each request gets a fresh
/// throttle instance per the gate contract.
struct FixedWindowFactory {
    windows: Arc<DashMap<String, (Instant, u32)>>,
}

impl FixedWindowFactory {
    fn new() -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
        }
    }
}

impl ThrottleFactory for FixedWindowFactory {
    fn build(&self, rate: &Rate) -> Box<dyn Throttle> {
        Box::new(FixedWindowThrottle {
            windows: Arc::clone(&self.windows),
            rate: *rate,
            denied_for: None,
        })
    }
}

struct FixedWindowThrottle {
    windows: Arc<DashMap<String, (Instant, u32)>>,
    rate: Rate,
    denied_for: Option<Duration>,
}

impl Throttle for FixedWindowThrottle {
    fn allow_request(&mut self, ctx: &RequestContext, _req: &Parts) -> bool {
        let key = ctx
            .identity()
            .map(|id| id.user.clone())
            .unwrap_or_else(|| "anon".to_string());

        let now = Instant::now();
        let mut entry = self.windows.entry(key).or_insert((now, 0));
        let (start, count) = *entry;

        if now.duration_since(start) >= self.rate.window {
            *entry = (now, 1);
            return true;
        }
        if count < self.rate.requests {
            entry.1 = count + 1;
            true
        } else {
            self.denied_for = Some(self.rate.window - now.duration_since(start));
            false
        }
    }

    fn wait(&self) -> Duration {
        self.denied_for.unwrap_or(self.rate.window)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    observability::logging::init_logging("request_gate=debug,tower_http=debug");

    let config = match cli.config {
        Some(path) => load_config(&path)?,
        None => GateConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Process-wide policy defaults.
    let mut defaults = PolicySet::new()
        .with_authenticator(Arc::new(BearerAuth))
        .with_permission(Arc::new(IsAuthenticated));
    if let Some(raw) = config.throttle.rate("anon") {
        let rate: Rate = raw.parse()?;
        defaults = defaults.with_throttle(ThrottleBinding::new(
            Arc::new(FixedWindowFactory::new()),
            rate,
        ));
        tracing::info!(rate = %rate, "Throttling enabled");
    }
    let gate = Arc::new(RequestGate::new(defaults));

    // /public overrides the permission list; /whoami inherits the defaults.
    let private_routes = Router::new().route("/whoami", get(whoami)).layer(
        axum::middleware::from_fn_with_state(GateState::new(Arc::clone(&gate)), gate_middleware),
    );
    let public_policy =
        ViewPolicy::inherit().permissions(vec![Arc::new(AllowAny) as Arc<dyn Permission>]);
    let public_routes = Router::new().route("/public", get(public)).layer(
        axum::middleware::from_fn_with_state(
            GateState::with_view(Arc::clone(&gate), public_policy),
            gate_middleware,
        ),
    );
    let app = private_routes.merge(public_routes);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = GateServer::new(config, app);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn whoami(Extension(ctx): Extension<RequestContext>) -> Json<Value> {
    let user = ctx
        .identity()
        .map(|id| id.user.clone())
        .unwrap_or_else(|| "anonymous".to_string());
    Json(json!({
        "user": user,
        "authenticated": ctx.is_authenticated(),
    }))
}

async fn public() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
