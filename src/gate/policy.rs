//! Policy lists and per-request resolution.

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::permissions::Permission;
use crate::throttling::ThrottleBinding;

/// Process-wide default policy lists. Order is precedence order: the first
/// authenticator to succeed wins, the first permission to deny wins.
#[derive(Clone, Default)]
pub struct PolicySet {
    pub authenticators: Vec<Arc<dyn Authenticator>>,
    pub permissions: Vec<Arc<dyn Permission>>,
    pub throttles: Vec<ThrottleBinding>,
}

impl PolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticators.push(authenticator);
        self
    }

    pub fn with_permission(mut self, permission: Arc<dyn Permission>) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn with_throttle(mut self, throttle: ThrottleBinding) -> Self {
        self.throttles.push(throttle);
        self
    }
}

/// Per-view policy overrides.
///
/// `None` inherits the process-wide default for that list; `Some` replaces it
/// outright, even when the replacement is empty. Lists are never merged.
#[derive(Clone, Default)]
pub struct ViewPolicy {
    pub authenticators: Option<Vec<Arc<dyn Authenticator>>>,
    pub permissions: Option<Vec<Arc<dyn Permission>>>,
    pub throttles: Option<Vec<ThrottleBinding>>,
}

impl ViewPolicy {
    /// Inherit every process-wide default.
    pub fn inherit() -> Self {
        Self::default()
    }

    pub fn authenticators(mut self, list: Vec<Arc<dyn Authenticator>>) -> Self {
        self.authenticators = Some(list);
        self
    }

    pub fn permissions(mut self, list: Vec<Arc<dyn Permission>>) -> Self {
        self.permissions = Some(list);
        self
    }

    pub fn throttles(mut self, list: Vec<ThrottleBinding>) -> Self {
        self.throttles = Some(list);
        self
    }
}

/// The lists actually in force for one request.
pub(crate) struct ResolvedPolicies {
    pub authenticators: Vec<Arc<dyn Authenticator>>,
    pub permissions: Vec<Arc<dyn Permission>>,
    pub throttles: Vec<ThrottleBinding>,
}

/// Resolve the per-request lists: view override where set, process default
/// otherwise. Called fresh on every dispatch, so a swapped default set is
/// observed by the next request.
pub(crate) fn resolve(defaults: &PolicySet, view: &ViewPolicy) -> ResolvedPolicies {
    ResolvedPolicies {
        authenticators: view
            .authenticators
            .clone()
            .unwrap_or_else(|| defaults.authenticators.clone()),
        permissions: view
            .permissions
            .clone()
            .unwrap_or_else(|| defaults.permissions.clone()),
        throttles: view
            .throttles
            .clone()
            .unwrap_or_else(|| defaults.throttles.clone()),
    }
}
