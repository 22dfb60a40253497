//! Gate middleware for Axum routers.

pub mod gate;

pub use gate::{gate_middleware, GateState};
