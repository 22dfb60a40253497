//! Request-lifecycle gate for Axum services.
//!
//! Inserts authentication, permission-checking, and rate-throttling steps in
//! front of a request handler, and centralizes error-to-response translation.
//!
//! ```text
//!     Incoming request
//!         │
//!         ▼
//!     ┌──────────────────────────────────────────────┐
//!     │                 RequestGate                  │
//!     │                                              │
//!     │  resolve policies (view override or default) │
//!     │      → perform_authentication                │
//!     │      → check_permissions                     │
//!     │      → check_throttles                       │
//!     └──────┬───────────────────────────┬───────────┘
//!            │ pass                      │ denial (ApiError)
//!            ▼                           ▼
//!     handler body               exception handler
//!     (RequestContext in         (structured 401/403/429
//!      request extensions)        response)
//! ```
//!
//! Strategies are pluggable: the gate depends only on the
//! [`auth::Authenticator`], [`permissions::Permission`], and
//! [`throttling::Throttle`] contracts.

pub mod auth;
pub mod config;
pub mod errors;
pub mod gate;
pub mod handler;
pub mod http;
pub mod observability;
pub mod permissions;
pub mod throttling;

pub use errors::ApiError;
pub use gate::{PolicySet, RequestContext, RequestGate, ViewPolicy};
pub use http::GateServer;
