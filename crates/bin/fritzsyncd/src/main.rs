//! # fritzsyncd — device bridge daemon
//!
//! Composition root that wires the gateway adapter, the bridge engines,
//! and the HTTP surface together.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Build the item registry from the declared device tree
//! - Construct the gateway client (real AHA gateway or the virtual one)
//! - Assemble the bridge, connect the session, and start the engines
//! - Build the axum router, bind to a TCP port, and serve
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no bridge logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use fritzsync_adapter_aha_http::AhaClient;
use fritzsync_adapter_http_axum::AppState;
use fritzsync_adapter_virtual::VirtualGateway;
use fritzsync_app::bridge::Bridge;
use fritzsync_app::item_bus::ItemEventBus;
use fritzsync_app::ports::GatewayClient;
use fritzsync_app::registry::ItemRegistry;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    if config.gateway.virtual_enabled {
        tracing::info!("using the virtual gateway");
        run(VirtualGateway::demo(), &config).await
    } else {
        let gateway = AhaClient::new(
            config.gateway_url()?,
            config.gateway.username.clone(),
            config.gateway.password.clone(),
        );
        tracing::info!(host = %config.gateway.host, "using the AHA gateway");
        run(gateway, &config).await
    }
}

async fn run<G: GatewayClient + 'static>(
    gateway: G,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(ItemRegistry::from_config(&config.device_declarations()));
    let bus = ItemEventBus::default();

    let mut bridge = Bridge::new(
        Arc::new(gateway),
        Arc::clone(&registry),
        bus.clone(),
        Duration::from_secs(config.poll.cycle_secs),
    );
    // A rejected login is logged inside; the bridge still starts and
    // serves stale values until a reconnect succeeds.
    bridge.session().connect().await;
    bridge.start();

    let state = AppState::new(registry, bus, bridge.poll_trigger());
    let app = fritzsync_adapter_http_axum::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "fritzsyncd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    bridge.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install the shutdown handler");
    }
    tracing::info!("shutdown requested");
}
