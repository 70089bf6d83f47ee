//! Shared service helpers: the published-supply holder and telemetry wiring.

pub mod publisher;
pub mod telemetry;

pub use publisher::*;
pub use telemetry::*;
