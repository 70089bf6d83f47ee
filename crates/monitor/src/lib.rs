//! Periodic supply computation: balance adapters, the calculator that turns
//! raw readings into a snapshot, and the scheduler that drives it. The API
//! process embeds this crate so handlers read the same publisher the job
//! writes to.

pub mod client;
pub mod pipeline;
pub mod rpc;
pub mod worker;

use std::sync::Arc;

use boa_supply_domain::config::{MonitorConfig, SupplyLedger};
use boa_supply_domain::SupplyPublisher;
use boa_supply_storage::SeaOrmStorage;
use tracing::info;

pub use client::JsonRpcClient;
pub use pipeline::{compute_snapshot, SupplyCalculator, SupplyInputs};
pub use rpc::{
    build_rpc_sources, NativeBalanceSource, RpcNativeSource, RpcTokenSource, TokenBalanceSource,
};
pub use worker::{
    run_tick, IntervalScheduler, MonitorError, SchedulerHandle, SchedulerState, SupplyJob,
};

/// Calculator wired to the production adapters.
pub type LiveSupplyCalculator = SupplyCalculator<RpcTokenSource, RpcNativeSource, SeaOrmStorage>;

/// Connects the pool and both RPC endpoints, then starts the scheduler.
/// The first tick runs immediately.
pub async fn start_supply_job(
    config: &MonitorConfig,
    ledger: SupplyLedger,
    publisher: Arc<SupplyPublisher>,
) -> Result<SchedulerHandle, MonitorError> {
    let storage = SeaOrmStorage::builder()
        .database_url(config.database_url())
        .max_connections(config.db_max_connections())
        .idle_timeout(config.db_idle_timeout())
        .build()
        .await?;
    let (token, native) = build_rpc_sources(
        config.token_rpc_url(),
        config.native_rpc_url(),
        ledger.token_contract.clone(),
        config.rpc_timeout(),
    )?;
    info!(
        token_rpc = config.token_rpc_url(),
        native_rpc = config.native_rpc_url(),
        tracked_addresses = ledger.token_address_count(),
        "supply sources ready"
    );

    let calculator = SupplyCalculator::new(token, native, storage, ledger, publisher);
    let scheduler = IntervalScheduler::new(config.interval(), config.tick_timeout());
    Ok(scheduler.start(Arc::new(calculator)))
}
