//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! incoming request
//!     → middleware/gate.rs (run the initial phase, attach RequestContext)
//!     → host handler (the view body)
//!     → response
//!
//! denial:
//!     → RequestGate::handle_exception → structured error response
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{gate_middleware, GateState};
pub use server::GateServer;
