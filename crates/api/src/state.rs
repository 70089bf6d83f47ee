use std::sync::Arc;

use boa_supply_domain::services::telemetry::TelemetryGuard;
use boa_supply_domain::SupplyPublisher;

/// Shared handler state. The publisher is the same instance the scheduler
/// writes to.
#[derive(Clone)]
pub struct AppState {
    publisher: Arc<SupplyPublisher>,
    telemetry: TelemetryGuard,
}

impl AppState {
    pub fn new(publisher: Arc<SupplyPublisher>, telemetry: TelemetryGuard) -> Self {
        Self {
            publisher,
            telemetry,
        }
    }

    pub fn publisher(&self) -> &SupplyPublisher {
        self.publisher.as_ref()
    }

    pub fn telemetry(&self) -> &TelemetryGuard {
        &self.telemetry
    }
}
