//! Domain-level building blocks shared across the API and monitor crates:
//! environment configuration, the supply data model, the published-snapshot
//! holder and telemetry wiring.

pub mod config;
pub mod model;
pub mod services;
pub mod storage;

pub use model::*;
pub use services::*;
pub use storage::*;
