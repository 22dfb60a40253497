//! Request gate subsystem.
//!
//! # Data Flow
//! ```text
//! request head (Parts)
//!     → policy.rs   (resolve view override or process default, fresh per request)
//!     → dispatch.rs (authenticate → permissions → throttles)
//!     → context.rs  (RequestContext handed to the handler on pass)
//!
//! any denial → ApiError → handler.rs (exception handler) → response
//! ```

pub mod context;
pub mod dispatch;
pub mod policy;

pub use context::RequestContext;
pub use dispatch::{Phase, RequestGate};
pub use policy::{PolicySet, ViewPolicy};
