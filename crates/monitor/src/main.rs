//! Headless supply job: computes and logs snapshots without serving them.
//! Useful for checking node and database connectivity.

use std::io;
use std::sync::Arc;

use boa_supply_domain::config::{MonitorConfig, SupplyLedger};
use boa_supply_domain::services::telemetry::{init_telemetry, TelemetryConfig};
use boa_supply_domain::SupplyPublisher;
use boa_supply_monitor::{start_supply_job, MonitorError};
use tracing::info;

#[tokio::main]
async fn main() -> io::Result<()> {
    if let Err(err) = bootstrap().await {
        eprintln!("[monitor] bootstrap failed: {err}");
        return Err(io::Error::other(err.to_string()));
    }

    Ok(())
}

async fn bootstrap() -> Result<(), MonitorError> {
    let config = MonitorConfig::load_from_env()?;
    let ledger = SupplyLedger::load_from_env()?;
    let telemetry_config = TelemetryConfig::from_env("MONITOR");
    let _telemetry = init_telemetry(&telemetry_config)?;

    let publisher = Arc::new(SupplyPublisher::new());
    let handle = start_supply_job(&config, ledger, publisher).await?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|err| MonitorError::Aborted(err.to_string()))?;
    info!("interrupt received, stopping supply scheduler");
    handle.stop().await
}
