//! Per-request transient state.

use std::fmt;
use std::sync::Arc;

use crate::auth::{Authenticator, Identity};

/// State accumulated while a single request moves through the initial phase.
///
/// Created at dispatch start and discarded at request end; never shared
/// across requests. On a pass it is attached to the request extensions so
/// handlers can read the established identity.
///
/// Invariant: at most one authenticator is active per request, set only when
/// it succeeded, `None` otherwise.
#[derive(Clone, Default)]
pub struct RequestContext {
    authenticated: bool,
    identity: Option<Identity>,
    active_authenticator: Option<Arc<dyn Authenticator>>,
}

impl RequestContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The authenticator that established this request's identity.
    pub fn active_authenticator(&self) -> Option<&Arc<dyn Authenticator>> {
        self.active_authenticator.as_ref()
    }

    /// Record a successful authentication.
    pub(crate) fn set_identity(
        &mut self,
        identity: Identity,
        authenticator: Arc<dyn Authenticator>,
    ) {
        self.authenticated = true;
        self.identity = Some(identity);
        self.active_authenticator = Some(authenticator);
    }

    /// Clear any identity after the authenticator list is exhausted.
    pub(crate) fn clear_identity(&mut self) {
        self.authenticated = false;
        self.identity = None;
        self.active_authenticator = None;
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("authenticated", &self.authenticated)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
