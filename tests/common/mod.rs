//! Shared strategy doubles for integration tests.

// Each test binary compiles this module separately; not every double is used
// by every binary.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use request_gate::auth::{Authenticator, Identity};
use request_gate::errors::ApiError;
use request_gate::gate::RequestContext;
use request_gate::permissions::Permission;
use request_gate::throttling::{Rate, Throttle, ThrottleBinding, ThrottleFactory};

/// Authenticator that never establishes an identity: for this scheme, absent
/// credentials are themselves an auth-domain failure.
pub struct FailingAuth {
    pub header: &'static str,
}

impl Authenticator for FailingAuth {
    fn authenticate(&self, _req: &Parts) -> Result<Option<Identity>, ApiError> {
        Err(ApiError::NotAuthenticated { auth_header: None })
    }

    fn authenticate_header(&self) -> String {
        self.header.to_string()
    }
}

/// Accepts `Authorization: Bearer <user>`; requests without the header fall
/// through to the next authenticator.
pub struct BearerAuth;

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

/// Permission that requires an established identity.
pub struct RequireUser;

impl Permission for RequireUser {
    fn has_permission(&self, ctx: &RequestContext, _req: &Parts) -> bool {
        ctx.is_authenticated()
    }

    fn message(&self) -> Option<String> {
        Some("authentication required".to_string())
    }
}

/// Throttle with a fixed verdict and wait.
struct StaticThrottle {
    allow: bool,
    wait: Duration,
}

impl Throttle for StaticThrottle {
    fn allow_request(&mut self, _ctx: &RequestContext, _req: &Parts) -> bool {
        self.allow
    }

    fn wait(&self) -> Duration {
        self.wait
    }
}

pub struct StaticThrottleFactory {
    allow: bool,
    wait: Duration,
}

impl StaticThrottleFactory {
    pub fn denying(wait_secs: u64) -> ThrottleBinding {
        ThrottleBinding::new(
            Arc::new(Self { allow: false, wait: Duration::from_secs(wait_secs) }),
            Rate::per_minute(10),
        )
    }

    pub fn allowing() -> ThrottleBinding {
        ThrottleBinding::new(
            Arc::new(Self { allow: true, wait: Duration::ZERO }),
            Rate::per_minute(10),
        )
    }
}

impl ThrottleFactory for StaticThrottleFactory {
    fn build(&self, _rate: &Rate) -> Box<dyn Throttle> {
        Box::new(StaticThrottle { allow: self.allow, wait: self.wait })
    }
}
