//! Service entry point: loads settings, wires adapters, serves HTTP and runs
//! the broker consumers until the server stops.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use contactbook::inbound::consumers::{default_handlers, spawn_consumers};
use contactbook::inbound::http::health::HealthState;
use contactbook::server::{AppSettings, build_adapters, build_http_state, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let bind_addr = settings.bind_addr()?;
    let consumer_settings = settings.consumer_settings()?;

    let adapters = build_adapters(&settings)
        .await
        .wrap_err("failed to initialise adapters")?;
    let http_state = build_http_state(&adapters);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumers = spawn_consumers(
        &adapters.broker,
        default_handlers(Arc::clone(&adapters.images)),
        &consumer_settings,
        &shutdown_rx,
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), http_state, bind_addr)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, consumers = consumers.len(), "contactbook listening");

    let served = server.await;
    health_state.mark_unhealthy();

    if shutdown_tx.send(true).is_err() {
        warn!("all consumers exited before shutdown");
    }
    for handle in consumers {
        if let Err(error) = handle.await {
            warn!(%error, "consumer task failed");
        }
    }
    info!("contactbook stopped");

    served.wrap_err("HTTP server failed")
}
