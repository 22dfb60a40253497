//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//! ```
//!
//! File configuration covers the service surface: listener address, request
//! timeout, named throttle rates, observability switches. The policy lists
//! themselves (authenticators, permissions, throttle strategies) are code
//! objects injected into [`crate::gate::RequestGate`] by the host.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{GateConfig, ListenerConfig, ObservabilityConfig, ThrottleConfig, TimeoutConfig};
pub use validation::{validate_config, ValidationError};
