use std::sync::Arc;

#[cfg(unix)]
use std::{fs, path::Path};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use boa_supply_domain::config::{ApiConfig, ConfigError, MonitorConfig, SupplyLedger};
use boa_supply_domain::services::telemetry::{init_telemetry, TelemetryConfig, TelemetryError};
use boa_supply_domain::SupplyPublisher;
use boa_supply_monitor::{start_supply_job, MonitorError};
use thiserror::Error;
use tracing::info;

use crate::{
    handlers::{
        circulating_supply_handler, health_handler, metrics_handler, total_supply_handler,
    },
    state::AppState,
};

/// Boots the process: configuration, telemetry, the supply scheduler and
/// finally the HTTP server. Returns once the server has drained (actix stops
/// it on SIGINT/SIGTERM) and the scheduler has finished its last tick.
pub async fn run() -> Result<(), BootstrapError> {
    let config = ApiConfig::load_from_env()?;
    let monitor_config = MonitorConfig::load_from_env()?;
    let ledger = SupplyLedger::load_from_env()?;

    let telemetry_config = TelemetryConfig::from_env("API");
    let telemetry = init_telemetry(&telemetry_config)?;

    let publisher = Arc::new(SupplyPublisher::new());
    let scheduler = start_supply_job(&monitor_config, ledger, Arc::clone(&publisher)).await?;

    let state = AppState::new(publisher, telemetry);
    let served = serve(&config, state).await;

    info!("http server stopped, shutting down supply scheduler");
    scheduler.stop().await?;
    served?;
    Ok(())
}

async fn serve(config: &ApiConfig, state: AppState) -> std::io::Result<()> {
    let cors_origins = config.cors_allowed_origins().to_vec();
    let any_origin = config.cors_allows_any_origin();
    let body_limit = config.body_limit_bytes();

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::JsonConfig::default().limit(body_limit))
            .app_data(web::FormConfig::default().limit(body_limit))
            .app_data(web::PayloadConfig::new(body_limit))
            .wrap(build_cors(any_origin, &cors_origins))
            .wrap(Logger::default())
            .configure(routes)
    });

    #[cfg(unix)]
    {
        if let Some(socket) = config.api_unix_socket() {
            cleanup_socket(socket)?;
            server = server.bind_uds(socket)?;
        } else {
            server = server.bind(config.api_bind_address())?;
        }
    }

    #[cfg(not(unix))]
    {
        if let Some(socket) = config.api_unix_socket() {
            return Err(std::io::Error::other(format!(
                "unix socket '{socket}' requested but this platform does not support it"
            )));
        }
        server = server.bind(config.api_bind_address())?;
    }

    info!(
        bind = config.api_unix_socket().unwrap_or(config.api_bind_address()),
        "serving supply endpoints"
    );
    server.run().await
}

pub(crate) fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health_handler))
        .route("/totalsupply", web::get().to(total_supply_handler))
        .route("/circulatingsupply", web::get().to(circulating_supply_handler))
        .route("/metrics", web::get().to(metrics_handler));
}

pub(crate) fn build_cors(any_origin: bool, origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);
    if any_origin {
        return cors.allow_any_origin();
    }
    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("supply job error: {0}")]
    Monitor(#[from] MonitorError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// A stale socket file from an unclean exit makes bind fail.
#[cfg(unix)]
fn cleanup_socket(path: &str) -> std::io::Result<()> {
    let socket_path = Path::new(path);
    if socket_path.exists() {
        fs::remove_file(socket_path)?;
    }
    Ok(())
}
