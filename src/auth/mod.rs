//! Authenticator contract.
//!
//! The gate does not depend on any specific authentication scheme. It only
//! knows this trait; concrete strategies (bearer tokens, API keys, sessions)
//! are injected by the host at startup time.

use axum::http::request::Parts;

use crate::errors::ApiError;

/// Identity established by a successful authentication: the user plus the
/// credential material that proved it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub credentials: Option<String>,
}

impl Identity {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into(), credentials: None }
    }

    pub fn with_credentials(user: impl Into<String>, credentials: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            credentials: Some(credentials.into()),
        }
    }
}

/// Pluggable authentication strategy.
///
/// `Ok(None)` means the request carries no credentials this strategy
/// recognizes and the next one in order is tried. `Err` means credentials
/// were present but malformed; the gate attaches this strategy's challenge
/// header to the error and stops the sequence.
pub trait Authenticator: Send + Sync {
    /// Attempt to derive an identity from the request head.
    fn authenticate(&self, req: &Parts) -> Result<Option<Identity>, ApiError>;

    /// `WWW-Authenticate` challenge advertised on 401 responses.
    fn authenticate_header(&self) -> String;
}
