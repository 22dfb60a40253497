//! API error taxonomy for the request gate.
//!
//! These are the "API exceptions" of the initial phase: unlike arbitrary
//! internal errors, each kind carries an intended HTTP status and a
//! machine-readable code. The gate attaches metadata (challenge header,
//! detail, wait duration) and hands the value to the exception handler; it
//! never builds responses itself.

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// A denial produced by the initial phase.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Credentials were presented but malformed or invalid.
    #[error("incorrect authentication credentials")]
    AuthenticationFailed {
        detail: Option<String>,
        /// Challenge from the authenticator that rejected the credentials.
        auth_header: Option<String>,
    },

    /// No authenticator established an identity, but one was required.
    #[error("authentication credentials were not provided")]
    NotAuthenticated { auth_header: Option<String> },

    /// The request is identified (or anonymous) but not allowed.
    #[error("you do not have permission to perform this action")]
    PermissionDenied {
        detail: Option<String>,
        code: Option<String>,
    },

    /// A rate limit was exceeded; the client must wait before retrying.
    #[error("request was throttled")]
    Throttled { wait: Duration },
}

impl ApiError {
    /// HTTP status the exception handler should respond with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationFailed { .. } | ApiError::NotAuthenticated { .. } => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            ApiError::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Machine-readable code. A denying permission may override the
    /// `permission_denied` default with its own code.
    pub fn code(&self) -> &str {
        match self {
            ApiError::AuthenticationFailed { .. } => "authentication_failed",
            ApiError::NotAuthenticated { .. } => "not_authenticated",
            ApiError::PermissionDenied { code: Some(code), .. } => code.as_str(),
            ApiError::PermissionDenied { .. } => "permission_denied",
            ApiError::Throttled { .. } => "throttled",
        }
    }

    /// Human-readable detail, falling back to the kind's default message.
    pub fn detail(&self) -> String {
        match self {
            ApiError::AuthenticationFailed { detail: Some(detail), .. }
            | ApiError::PermissionDenied { detail: Some(detail), .. } => detail.clone(),
            ApiError::Throttled { wait } => {
                format!("request was throttled, retry in {} seconds", secs_ceil(*wait))
            }
            _ => self.to_string(),
        }
    }

    /// `WWW-Authenticate` challenge carried by auth-family errors.
    pub fn auth_header(&self) -> Option<&str> {
        match self {
            ApiError::AuthenticationFailed { auth_header, .. }
            | ApiError::NotAuthenticated { auth_header } => auth_header.as_deref(),
            _ => None,
        }
    }

    /// Attach a challenge header to auth-family errors. Other kinds never
    /// carry a challenge and pass through unchanged.
    pub(crate) fn with_auth_header(self, header: String) -> Self {
        match self {
            ApiError::AuthenticationFailed { detail, .. } => ApiError::AuthenticationFailed {
                detail,
                auth_header: Some(header),
            },
            ApiError::NotAuthenticated { .. } => ApiError::NotAuthenticated {
                auth_header: Some(header),
            },
            other => other,
        }
    }
}

/// Whole seconds, rounded up. Used for `Retry-After` and throttle details.
pub(crate) fn secs_ceil(wait: Duration) -> u64 {
    wait.as_secs() + u64::from(wait.subsec_nanos() > 0)
}
